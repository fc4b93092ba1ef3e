// Cell Phase - Maps elapsed beats onto a row's cells
// One cycle always lasts `base_length` beats, so rows of different resolution stay phase-locked

/// Where a row currently is within its cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPhase {
    /// Current cell index in `[0, cell_count)`
    pub index: usize,

    /// Progress through the current cell [0.0, 1.0)
    pub sub_cell_progress: f64,

    /// Total number of whole cells elapsed since beat 0
    pub cells_passed: u64,
}

impl CellPhase {
    const ZERO: CellPhase = CellPhase {
        index: 0,
        sub_cell_progress: 0.0,
        cells_passed: 0,
    };
}

/// Continuous cell position; negative or non-finite input clamps to 0
fn cell_position(elapsed_beats: f64, cell_count: usize, base_length: f64) -> f64 {
    if cell_count == 0 || !(base_length > 0.0) || !elapsed_beats.is_finite() {
        return 0.0;
    }
    (elapsed_beats.max(0.0) * cell_count as f64 / base_length).max(0.0)
}

/// Whole cells elapsed: `floor(elapsed_beats * cell_count / base_length)`
pub fn cells_passed(elapsed_beats: f64, cell_count: usize, base_length: f64) -> u64 {
    cell_position(elapsed_beats, cell_count, base_length).floor() as u64
}

/// Compute cell index, sub-cell progress and cells passed in O(1)
pub fn cell_phase(pattern: &[bool], elapsed_beats: f64, base_length: f64) -> CellPhase {
    let cell_count = pattern.len();
    if cell_count == 0 {
        return CellPhase::ZERO;
    }

    let position = cell_position(elapsed_beats, cell_count, base_length);
    let whole = position.floor();
    let cells_passed = whole as u64;

    CellPhase {
        index: (cells_passed % cell_count as u64) as usize,
        sub_cell_progress: (position - whole).clamp(0.0, 1.0),
        cells_passed,
    }
}
