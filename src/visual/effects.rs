// Effect Accumulators - Growth, tilt, rotation and Y-flip
// Recomputed from elapsed beats every frame; nothing is carried between frames

use std::f64::consts::TAU;

use crate::pattern::RowPattern;
use crate::timing::toggle_at;
use super::settings::VisualSettings;

/// One beat is half a rotation of the orbit
pub const BEATS_PER_ROTATION: f64 = 2.0;

/// Scene rotation in radians, zero while the rotation row is toggled off.
/// The direction row selects clockwise (on) or counter-clockwise (off).
pub fn rotation_angle(
    enabled: &RowPattern,
    direction: &RowPattern,
    elapsed_beats: f64,
    rotation_speed: f64,
) -> f64 {
    if !toggle_at(enabled, elapsed_beats) {
        return 0.0;
    }
    let sign = if toggle_at(direction, elapsed_beats) { 1.0 } else { -1.0 };
    (elapsed_beats * rotation_speed * sign).rem_euclid(TAU)
}

/// Y-flip state: the flip row XOR the stack's static flip, so two flips cancel
pub fn flip_y(flip: &RowPattern, elapsed_beats: f64, stack_flip: bool) -> bool {
    toggle_at(flip, elapsed_beats) ^ stack_flip
}

/// Radial growth offset, wrapped to stay within the ring span.
///
/// Re-enabling resumes at the phase implied by total elapsed time.
pub fn growth_offset(growth: &RowPattern, elapsed_beats: f64, settings: &VisualSettings) -> f64 {
    if !toggle_at(growth, elapsed_beats) {
        return 0.0;
    }
    let span = settings.ring_span();
    if span <= 0.0 {
        return 0.0;
    }
    let full_rotations = elapsed_beats / BEATS_PER_ROTATION;
    (full_rotations * settings.growth_rate * settings.circle_spacing).rem_euclid(span)
}

/// 3D tilt angle in radians, wrapped to [0, 2π)
pub fn tilt_angle(tilt: &RowPattern, elapsed_beats: f64, tilt_speed: f64) -> f64 {
    if !toggle_at(tilt, elapsed_beats) {
        return 0.0;
    }
    (elapsed_beats * tilt_speed).rem_euclid(TAU)
}
