// Toggle Evaluator - Parity state and signed direction angle of a row
// Cost depends only on the pattern length, never on how long playback has run

use serde::{Deserialize, Serialize};

use super::phase::cells_passed;
use crate::pattern::RowPattern;

/// Orbit direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reversed,
}

impl Direction {
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reversed => -1.0,
        }
    }

    pub fn flipped(&self) -> Direction {
        match self {
            Direction::Forward => Direction::Reversed,
            Direction::Reversed => Direction::Forward,
        }
    }

    fn from_parity(odd: bool) -> Direction {
        if odd {
            Direction::Reversed
        } else {
            Direction::Forward
        }
    }
}

/// Result of accumulating a direction row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionAngle {
    /// Signed angle accumulated over the passed cells
    pub angle: f64,

    /// Direction in effect after the last passed cell
    pub current_direction: Direction,
}

/// Per-cycle summary of a pattern, computed once in O(cell_count)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub cell_count: usize,

    /// Hit cells in one cycle
    pub hits_per_cycle: u64,

    /// Net cell steps (+1 forward, -1 reversed) of one cycle entered going forward
    pub net_steps: i64,
}

impl CycleSummary {
    pub fn of(pattern: &[bool]) -> Self {
        let (net_steps, _) = walk(pattern, Direction::Forward);
        CycleSummary {
            cell_count: pattern.len(),
            hits_per_cycle: pattern.iter().filter(|&&c| c).count() as u64,
            net_steps,
        }
    }
}

/// Walk cells from a starting direction. Each hit flips the direction
/// before its cell steps. Returns net steps and the final direction.
fn walk(cells: &[bool], start: Direction) -> (i64, Direction) {
    let mut direction = start;
    let mut steps = 0i64;
    for &hit in cells {
        if hit {
            direction = direction.flipped();
        }
        steps += direction.sign() as i64;
    }
    (steps, direction)
}

/// Number of hits among the first `cells_passed` cells, cyclically
pub fn toggle_count(pattern: &[bool], cells_passed: u64) -> u64 {
    if pattern.is_empty() {
        return 0;
    }
    let summary = CycleSummary::of(pattern);
    let cell_count = summary.cell_count as u64;
    let complete_cycles = cells_passed / cell_count;
    let remainder = (cells_passed % cell_count) as usize;

    let prefix_hits = pattern[..remainder].iter().filter(|&&c| c).count() as u64;
    // complete_cycles * hits_per_cycle <= cells_passed, so this cannot overflow
    complete_cycles * summary.hits_per_cycle + prefix_hits
}

/// Binary state after `cells_passed` cells: each hit flips it, starting from off
pub fn current_toggle_state(pattern: &[bool], cells_passed: u64) -> bool {
    toggle_count(pattern, cells_passed) % 2 == 1
}

/// Accumulated signed angle after `cells_passed` cells.
///
/// Every cell contributes `angle_per_cell` in the running direction; each hit
/// flips the direction before its own cell contributes.
pub fn direction_angle(pattern: &[bool], cells_passed: u64, angle_per_cell: f64) -> DirectionAngle {
    if pattern.is_empty() {
        return DirectionAngle {
            angle: 0.0,
            current_direction: Direction::Forward,
        };
    }

    let summary = CycleSummary::of(pattern);
    let cell_count = summary.cell_count as u64;
    let complete_cycles = cells_passed / cell_count;
    let remainder = (cells_passed % cell_count) as usize;

    // A cycle entered reversed contributes exactly the negated forward net.
    // With an even hit count every cycle starts forward; with an odd count
    // they alternate and pairs cancel.
    let cycle_steps = if summary.hits_per_cycle % 2 == 0 {
        complete_cycles as f64 * summary.net_steps as f64
    } else if complete_cycles % 2 == 1 {
        summary.net_steps as f64
    } else {
        0.0
    };

    let odd_flips = (complete_cycles % 2 == 1) && (summary.hits_per_cycle % 2 == 1);
    let start = Direction::from_parity(odd_flips);
    let (remainder_steps, current_direction) = walk(&pattern[..remainder], start);

    DirectionAngle {
        angle: (cycle_steps + remainder_steps as f64) * angle_per_cell,
        current_direction,
    }
}

/// Toggle state of a row at a point in time.
///
/// Parity of the hits among the completed cells; a hit takes effect once its cell has passed.
pub fn toggle_at(row: &RowPattern, elapsed_beats: f64) -> bool {
    if row.cells.is_empty() {
        return false;
    }
    let passed = cells_passed(elapsed_beats, row.cells.len(), row.cycle_beats());
    current_toggle_state(&row.cells, passed)
}
