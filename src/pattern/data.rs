// Pattern Data - A named bundle of rows plus its instrument and overrides

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kinds::{PatternRows, RowKind};
use crate::visual::settings::{SynthOverrides, VisualOverrides};

/// Which scene a pattern drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Dots orbiting a center; the radius row glides the orbit
    #[default]
    Orbital,

    /// Concentric rings; the spread row glides ring spacing
    Concentric,
}

impl Instrument {
    /// Whether a position row is interpolated for this instrument.
    /// Unused position rows stay pinned at their primary endpoint.
    pub fn drives_position(&self, kind: RowKind) -> bool {
        match (self, kind) {
            (Instrument::Orbital, RowKind::RadiusPosition) => true,
            (Instrument::Concentric, RowKind::SpreadPosition) => true,
            _ => false,
        }
    }
}

fn default_bars() -> u32 {
    4
}

/// A programmable pattern as stored in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternData {
    pub id: Uuid,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub rows: PatternRows,

    #[serde(default)]
    pub instrument: Instrument,

    /// Length in bars when placed on the arrangement timeline
    #[serde(default = "default_bars")]
    pub bars: u32,

    /// Per-pattern visual parameters layered over the global settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualOverrides>,

    /// Per-pattern synth parameters layered over the global settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synth: Option<SynthOverrides>,
}

impl PatternData {
    /// Create an empty pattern with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        PatternData {
            id: Uuid::new_v4(),
            name: name.into(),
            rows: PatternRows::default(),
            instrument: Instrument::default(),
            bars: default_bars(),
            visual: None,
            synth: None,
        }
    }

    /// Deep copy under a new id
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        PatternData {
            id: Uuid::new_v4(),
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn row_count_with_hits(&self) -> usize {
        self.rows.iter().filter(|(_, row)| row.hits() > 0).count()
    }
}
