// Position Interpolation - Continuous blend between two endpoint states
// A hit cell glides to the other endpoint over exactly one cell

use super::phase::cell_phase;
use super::toggle::current_toggle_state;

/// Blend value in [0.0, 1.0] between the primary (0) and secondary (1) endpoint.
///
/// Inactive rows stay pinned at the primary endpoint. On a hit cell the value
/// moves linearly from the endpoint held before the hit to the other one, so
/// it never jumps at a cell boundary.
pub fn position_blend(pattern: &[bool], elapsed_beats: f64, base_length: f64, active: bool) -> f64 {
    if !active || pattern.is_empty() {
        return 0.0;
    }

    let phase = cell_phase(pattern, elapsed_beats, base_length);
    let at_secondary = current_toggle_state(pattern, phase.cells_passed);
    let progress = phase.sub_cell_progress;

    match (pattern[phase.index], at_secondary) {
        (true, true) => 1.0 - progress,
        (true, false) => progress,
        (false, true) => 1.0,
        (false, false) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(bits: &str) -> Vec<bool> {
        bits.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_inactive_is_primary() {
        let p = pattern("1111");
        assert_eq!(position_blend(&p, 2.5, 4.0, false), 0.0);
    }

    #[test]
    fn test_transition_within_hit_cell() {
        let p = pattern("0100");
        assert_eq!(position_blend(&p, 0.5, 4.0, true), 0.0);
        assert!((position_blend(&p, 1.25, 4.0, true) - 0.25).abs() < 1e-9);
        assert!((position_blend(&p, 1.75, 4.0, true) - 0.75).abs() < 1e-9);
        assert_eq!(position_blend(&p, 2.5, 4.0, true), 1.0);
        // Second cycle glides back
        assert!((position_blend(&p, 5.25, 4.0, true) - 0.75).abs() < 1e-9);
        assert_eq!(position_blend(&p, 6.0, 4.0, true), 0.0);
    }

    #[test]
    fn test_continuity_at_cell_boundaries() {
        let epsilon = 1e-6;
        for bits in ["1101", "0110", "1000", "11111", "0010010001"] {
            let p = pattern(bits);
            let base_length = 8.0;
            let beats_per_cell = base_length / p.len() as f64;
            for boundary in 1..(3 * p.len()) {
                let t = boundary as f64 * beats_per_cell;
                let before = position_blend(&p, t - epsilon, base_length, true);
                let after = position_blend(&p, t, base_length, true);
                assert!(
                    (before - after).abs() < 1e-4,
                    "pattern {} jumps at boundary {}: {} -> {}",
                    bits,
                    boundary,
                    before,
                    after
                );
            }
        }
    }

    #[test]
    fn test_blend_stays_in_range() {
        let p = pattern("1011");
        for i in 0..200 {
            let value = position_blend(&p, i as f64 * 0.137, 4.0, true);
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
