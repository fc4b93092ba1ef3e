// Piano-Roll Bridge - Converts row cells to and from MIDI-style notes
// Each row kind maps to one fixed pitch; conversion is lossy in general

use serde::{Deserialize, Serialize};

use crate::pattern::{PatternRows, RowKind, RowPattern};

/// Piano-roll resolution
pub const TICKS_PER_BEAT: u32 = 480;

pub const DEFAULT_VELOCITY: u8 = 100;

/// A note as the piano roll stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidiNote {
    pub pitch: u8,
    pub start_tick: u32,
    pub duration: u32,
    pub velocity: u8,
}

/// Fixed pitch for each row (C major scale from middle C)
pub fn row_pitch(kind: RowKind) -> u8 {
    match kind {
        RowKind::Direction => 60,
        RowKind::DotVisibility => 62,
        RowKind::RingVisibility => 64,
        RowKind::RadiusPosition => 65,
        RowKind::SpreadPosition => 67,
        RowKind::Growth => 69,
        RowKind::Tilt => 71,
        RowKind::RotationEnabled => 72,
        RowKind::RotationDirection => 74,
        RowKind::FlipY => 76,
    }
}

/// Row a pitch belongs to, if any
pub fn kind_for_pitch(pitch: u8) -> Option<RowKind> {
    RowKind::ALL.into_iter().find(|&kind| row_pitch(kind) == pitch)
}

/// Length of one cell in ticks
pub fn ticks_per_cell(row: &RowPattern) -> u32 {
    if row.cells.is_empty() {
        return 0;
    }
    (row.cycle_beats() * TICKS_PER_BEAT as f64 / row.cells.len() as f64).round() as u32
}

/// Length of one row cycle in ticks
pub fn cycle_ticks(row: &RowPattern) -> u32 {
    (row.cycle_beats() * TICKS_PER_BEAT as f64).round() as u32
}

/// One note per hit cell, one cell long, sorted by start tick then pitch
pub fn rows_to_notes(rows: &PatternRows, velocity: u8) -> Vec<MidiNote> {
    let velocity = velocity.clamp(1, 127);
    let mut notes: Vec<MidiNote> = rows
        .iter()
        .flat_map(|(kind, row)| {
            let step = ticks_per_cell(row);
            row.cells
                .iter()
                .enumerate()
                .filter(|(_, hit)| **hit)
                .map(move |(i, _)| MidiNote {
                    pitch: row_pitch(kind),
                    start_tick: i as u32 * step,
                    duration: step,
                    velocity,
                })
        })
        .collect();

    notes.sort_by_key(|n| (n.start_tick, n.pitch));
    notes
}

/// Rebuild rows from piano-roll notes.
///
/// Row configurations come from `template`; its cells are replaced. A note
/// sets the cell containing its start tick, folded into one cycle. Notes on
/// pitches no row uses are ignored.
pub fn notes_to_rows(notes: &[MidiNote], template: &PatternRows) -> PatternRows {
    let mut rows = template.clone();
    for kind in RowKind::ALL {
        rows.row_mut(kind).clear();
    }

    for note in notes {
        let Some(kind) = kind_for_pitch(note.pitch) else {
            continue;
        };
        let row = rows.row_mut(kind);
        let step = ticks_per_cell(row);
        let cycle = cycle_ticks(row);
        if step == 0 || cycle == 0 {
            continue;
        }
        let index = ((note.start_tick % cycle) / step) as usize;
        row.set_cell(index, true);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{BaseLength, Subdivision};

    #[test]
    fn test_pitches_unique() {
        for kind in RowKind::ALL {
            assert_eq!(kind_for_pitch(row_pitch(kind)), Some(kind));
        }
        assert_eq!(kind_for_pitch(61), None);
    }

    #[test]
    fn test_ticks_per_cell() {
        let row = RowPattern::new(BaseLength::Sixteen, Subdivision::Whole);
        assert_eq!(ticks_per_cell(&row), 480);
        let row = RowPattern::new(BaseLength::Four, Subdivision::Quadruple);
        assert_eq!(ticks_per_cell(&row), 120);
        let row = RowPattern::new(BaseLength::SixtyFour, Subdivision::Quarter);
        assert_eq!(ticks_per_cell(&row), 1920);
    }

    #[test]
    fn test_rows_to_notes() {
        let mut rows = PatternRows::default();
        rows.direction.set_cell(2, true);
        rows.growth = RowPattern::new(BaseLength::Sixteen, Subdivision::Double);
        rows.growth.set_cell(1, true);

        let notes = rows_to_notes(&rows, 90);
        assert_eq!(
            notes,
            vec![
                MidiNote { pitch: 69, start_tick: 240, duration: 240, velocity: 90 },
                MidiNote { pitch: 60, start_tick: 960, duration: 480, velocity: 90 },
            ]
        );
    }

    #[test]
    fn test_notes_to_rows_folds_and_ignores() {
        let template = PatternRows::uniform(BaseLength::Four, Subdivision::Whole);
        let notes = vec![
            MidiNote { pitch: 60, start_tick: 500, duration: 10, velocity: 100 },
            // Second cycle folds back onto cell 3
            MidiNote { pitch: 76, start_tick: 480 * 7, duration: 480, velocity: 100 },
            MidiNote { pitch: 61, start_tick: 0, duration: 480, velocity: 100 },
        ];
        let rows = notes_to_rows(&notes, &template);
        assert_eq!(rows.direction.cells, vec![false, true, false, false]);
        assert_eq!(rows.flip_y.cells, vec![false, false, false, true]);
        assert_eq!(rows.total_hits(), 2);
    }

    #[test]
    fn test_notes_round_trip_cells() {
        let mut rows = PatternRows::uniform(BaseLength::Eight, Subdivision::Half);
        rows.tilt.set_cell(0, true);
        rows.ring_visibility.set_cell(3, true);
        let back = notes_to_rows(&rows_to_notes(&rows, DEFAULT_VELOCITY), &rows);
        assert_eq!(back, rows);
    }

    #[test]
    fn test_note_json_field_names() {
        let note = MidiNote { pitch: 60, start_tick: 0, duration: 480, velocity: 100 };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("startTick"));
    }
}
