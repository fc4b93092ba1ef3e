// Piano-Roll Bridge - Row cells as notes, and Standard MIDI File export

pub mod midi;
pub mod notes;

pub use midi::{export_pattern_midi, MidiError, MidiExportOptions, MidiResult};
pub use notes::{
    cycle_ticks, kind_for_pitch, notes_to_rows, row_pitch, rows_to_notes, ticks_per_cell, MidiNote,
    DEFAULT_VELOCITY, TICKS_PER_BEAT,
};
