// Row Kinds - The fixed set of programmable rows in a pattern
// Seven instrument rows drive the orbit scene, three effect rows modulate it

use serde::{Deserialize, Serialize};

use super::row::{BaseLength, RowPattern, Subdivision};

/// Every row a pattern carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Each hit reverses the orbit direction
    Direction,

    /// Each hit shows/hides the orbiting dots
    DotVisibility,

    /// Each hit shows/hides the concentric rings
    RingVisibility,

    /// Each hit glides the orbit radius to the other endpoint
    RadiusPosition,

    /// Each hit glides the ring spread to the other endpoint
    SpreadPosition,

    /// Each hit starts/stops ring growth
    Growth,

    /// Each hit starts/stops 3D tilt
    Tilt,

    /// Each hit starts/stops whole-scene rotation
    RotationEnabled,

    /// Each hit flips rotation between clockwise and counter-clockwise
    RotationDirection,

    /// Each hit mirrors the scene vertically
    FlipY,
}

impl RowKind {
    pub const INSTRUMENT_ROWS: [RowKind; 7] = [
        RowKind::Direction,
        RowKind::DotVisibility,
        RowKind::RingVisibility,
        RowKind::RadiusPosition,
        RowKind::SpreadPosition,
        RowKind::Growth,
        RowKind::Tilt,
    ];

    pub const EFFECT_ROWS: [RowKind; 3] = [
        RowKind::RotationEnabled,
        RowKind::RotationDirection,
        RowKind::FlipY,
    ];

    pub const ALL: [RowKind; 10] = [
        RowKind::Direction,
        RowKind::DotVisibility,
        RowKind::RingVisibility,
        RowKind::RadiusPosition,
        RowKind::SpreadPosition,
        RowKind::Growth,
        RowKind::Tilt,
        RowKind::RotationEnabled,
        RowKind::RotationDirection,
        RowKind::FlipY,
    ];

    pub fn is_effect(&self) -> bool {
        Self::EFFECT_ROWS.contains(self)
    }

    /// Human-readable name for UI display
    pub fn display_name(&self) -> &'static str {
        match self {
            RowKind::Direction => "Direction",
            RowKind::DotVisibility => "Dots",
            RowKind::RingVisibility => "Rings",
            RowKind::RadiusPosition => "Radius",
            RowKind::SpreadPosition => "Spread",
            RowKind::Growth => "Growth",
            RowKind::Tilt => "3D Tilt",
            RowKind::RotationEnabled => "Rotate",
            RowKind::RotationDirection => "Rotate Dir",
            RowKind::FlipY => "Flip Y",
        }
    }
}

/// All rows of one pattern, one field per kind.
///
/// Missing rows in stored data deserialize to an all-off row of the default
/// configuration (16 beats, whole subdivision).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRows {
    pub direction: RowPattern,
    pub dot_visibility: RowPattern,
    pub ring_visibility: RowPattern,
    pub radius_position: RowPattern,
    pub spread_position: RowPattern,
    pub growth: RowPattern,
    pub tilt: RowPattern,
    pub rotation_enabled: RowPattern,
    pub rotation_direction: RowPattern,
    pub flip_y: RowPattern,
}

impl PatternRows {
    /// Create rows that all share one timing configuration
    pub fn uniform(base_length: BaseLength, subdivision: Subdivision) -> Self {
        let row = RowPattern::new(base_length, subdivision);
        PatternRows {
            direction: row.clone(),
            dot_visibility: row.clone(),
            ring_visibility: row.clone(),
            radius_position: row.clone(),
            spread_position: row.clone(),
            growth: row.clone(),
            tilt: row.clone(),
            rotation_enabled: row.clone(),
            rotation_direction: row.clone(),
            flip_y: row,
        }
    }

    pub fn row(&self, kind: RowKind) -> &RowPattern {
        match kind {
            RowKind::Direction => &self.direction,
            RowKind::DotVisibility => &self.dot_visibility,
            RowKind::RingVisibility => &self.ring_visibility,
            RowKind::RadiusPosition => &self.radius_position,
            RowKind::SpreadPosition => &self.spread_position,
            RowKind::Growth => &self.growth,
            RowKind::Tilt => &self.tilt,
            RowKind::RotationEnabled => &self.rotation_enabled,
            RowKind::RotationDirection => &self.rotation_direction,
            RowKind::FlipY => &self.flip_y,
        }
    }

    pub fn row_mut(&mut self, kind: RowKind) -> &mut RowPattern {
        match kind {
            RowKind::Direction => &mut self.direction,
            RowKind::DotVisibility => &mut self.dot_visibility,
            RowKind::RingVisibility => &mut self.ring_visibility,
            RowKind::RadiusPosition => &mut self.radius_position,
            RowKind::SpreadPosition => &mut self.spread_position,
            RowKind::Growth => &mut self.growth,
            RowKind::Tilt => &mut self.tilt,
            RowKind::RotationEnabled => &mut self.rotation_enabled,
            RowKind::RotationDirection => &mut self.rotation_direction,
            RowKind::FlipY => &mut self.flip_y,
        }
    }

    /// Iterate rows in display order
    pub fn iter(&self) -> impl Iterator<Item = (RowKind, &RowPattern)> {
        RowKind::ALL.into_iter().map(move |kind| (kind, self.row(kind)))
    }

    /// Resize every row whose cells don't match its configuration.
    /// Returns the kinds that had to be fixed.
    pub fn normalize(&mut self) -> Vec<RowKind> {
        RowKind::ALL
            .into_iter()
            .filter(|&kind| self.row_mut(kind).normalize())
            .collect()
    }

    /// Total number of hit cells across all rows
    pub fn total_hits(&self) -> usize {
        self.iter().map(|(_, row)| row.hits()).sum()
    }
}
