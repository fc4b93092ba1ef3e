// Timing Engine - Cell phase, toggle parity and position interpolation
// Pure functions of elapsed beats and pattern data

pub mod interpolate;
pub mod phase;
pub mod toggle;

pub use interpolate::position_blend;
pub use phase::{cell_phase, cells_passed, CellPhase};
pub use toggle::{
    current_toggle_state, direction_angle, toggle_at, toggle_count, CycleSummary, Direction,
    DirectionAngle,
};
