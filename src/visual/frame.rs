// Orbit Frame - The complete animation state of one stack for one frame
// Built from a single FrameInput, so any point in time can be reproduced exactly

use serde::Serialize;
use std::f64::consts::{PI, TAU};

use super::effects::{flip_y, growth_offset, rotation_angle, tilt_angle};
use super::settings::{SynthSettings, VisualSettings};
use crate::arranger::{ActiveLayer, StackSettings};
use crate::pattern::{Instrument, PatternRows, RowKind, RowPattern};
use crate::timing::{cell_phase, direction_angle, position_blend, toggle_at, Direction};
use crate::transport::FrameInput;

/// Resolved scene state for one stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitFrame {
    /// Orbit angle of the lead dot in [0, 2π)
    pub orbit_angle: f64,

    /// Direction the dots are currently travelling
    pub direction: Direction,

    pub dots_visible: bool,
    pub rings_visible: bool,

    /// Blend factors [0.0, 1.0] between primary and secondary endpoints
    pub radius_blend: f64,
    pub spread_blend: f64,

    /// Endpoint values after blending
    pub radius: f64,
    pub spread: f64,

    pub growth_offset: f64,
    pub tilt_angle: f64,
    pub rotation_angle: f64,
    pub flip_y: bool,
}

/// Orbit angle from the direction row: half a rotation per beat, each hit
/// reversing travel at the onset of its cell.
fn orbit_angle(row: &RowPattern, elapsed_beats: f64) -> (f64, Direction) {
    if row.cells.is_empty() {
        return ((elapsed_beats * PI).rem_euclid(TAU), Direction::Forward);
    }

    let cycle_beats = row.cycle_beats();
    let angle_per_cell = PI * cycle_beats / row.cells.len() as f64;
    let phase = cell_phase(&row.cells, elapsed_beats, cycle_beats);
    let passed = direction_angle(&row.cells, phase.cells_passed, angle_per_cell);

    let direction = if row.cells[phase.index] {
        passed.current_direction.flipped()
    } else {
        passed.current_direction
    };
    let angle = passed.angle + direction.sign() * phase.sub_cell_progress * angle_per_cell;
    (angle.rem_euclid(TAU), direction)
}

fn blend_row(row: &RowPattern, elapsed_beats: f64, active: bool) -> f64 {
    position_blend(&row.cells, elapsed_beats, row.cycle_beats(), active)
}

fn lerp((from, to): (f64, f64), t: f64) -> f64 {
    from + (to - from) * t
}

/// Compute the scene state of one stack
pub fn compute_orbit_frame(
    input: &FrameInput,
    rows: &PatternRows,
    instrument: Instrument,
    visual: &VisualSettings,
    stack_flip: bool,
) -> OrbitFrame {
    let beats = input.beats_elapsed;
    let (orbit_angle, direction) = orbit_angle(&rows.direction, beats);

    let radius_blend = blend_row(
        &rows.radius_position,
        beats,
        instrument.drives_position(RowKind::RadiusPosition),
    );
    let spread_blend = blend_row(
        &rows.spread_position,
        beats,
        instrument.drives_position(RowKind::SpreadPosition),
    );

    OrbitFrame {
        orbit_angle,
        direction,
        // Visible until the first hit hides them
        dots_visible: !toggle_at(&rows.dot_visibility, beats),
        rings_visible: !toggle_at(&rows.ring_visibility, beats),
        radius_blend,
        spread_blend,
        radius: lerp(visual.radius_range, radius_blend),
        spread: lerp(visual.spread_range, spread_blend),
        growth_offset: growth_offset(&rows.growth, beats, visual),
        tilt_angle: tilt_angle(&rows.tilt, beats, visual.tilt_speed),
        rotation_angle: rotation_angle(
            &rows.rotation_enabled,
            &rows.rotation_direction,
            beats,
            visual.rotation_speed,
        ),
        flip_y: flip_y(&rows.flip_y, beats, stack_flip),
    }
}

/// Everything the renderer needs for one stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerFrame {
    pub stack: u32,
    pub transform: StackSettings,
    pub instrument: Instrument,
    pub visual: VisualSettings,
    pub synth: SynthSettings,
    pub frame: OrbitFrame,
}

/// Turn resolved layers into renderer-ready frames, keeping stack order
pub fn compose_layers(
    input: &FrameInput,
    layers: &[ActiveLayer<'_>],
    visual: &VisualSettings,
    synth: &SynthSettings,
) -> Vec<LayerFrame> {
    layers
        .iter()
        .map(|layer| {
            let visual = visual.merged(layer.visual);
            let frame = compute_orbit_frame(
                input,
                layer.rows,
                layer.instrument,
                &visual,
                layer.transform.flip_y,
            );
            LayerFrame {
                stack: layer.stack,
                transform: layer.transform,
                instrument: layer.instrument,
                synth: synth.merged(layer.synth),
                visual,
                frame,
            }
        })
        .collect()
}
