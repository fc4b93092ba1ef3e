// MIDI Export - Write a pattern as a Standard MIDI File using the midly crate
// One track per programmed row, each row's cycle repeated across the pattern's bars

use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::notes::{row_pitch, ticks_per_cell, DEFAULT_VELOCITY, TICKS_PER_BEAT};
use crate::pattern::{PatternData, RowKind, RowPattern};
use crate::transport::BEATS_PER_BAR;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("Failed to write MIDI: {0}")]
    Write(String),
}

pub type MidiResult<T> = Result<T, MidiError>;

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include track names
    pub track_names: bool,

    /// MIDI channel (0-15)
    pub channel: u8,

    pub velocity: u8,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: TICKS_PER_BEAT as u16,
            include_tempo: true,
            track_names: true,
            channel: 0,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

/// Export a pattern to MIDI file bytes
///
/// Track 0 carries tempo and time signature; every row with at least one hit
/// gets its own track at the row's fixed pitch.
pub fn export_pattern_midi(
    pattern: &PatternData,
    bpm: f64,
    options: &MidiExportOptions,
) -> MidiResult<Vec<u8>> {
    let header = Header {
        format: midly::Format::Parallel,
        timing: Timing::Metrical(options.ppq.into()),
    };

    let total_beats = pattern.bars.max(1) as f64 * BEATS_PER_BAR;
    let scale = options.ppq as f64 / TICKS_PER_BEAT as f64;
    let end_tick = (total_beats * options.ppq as f64).round() as u32;

    let mut tracks = Vec::new();

    let mut meta_track = Track::new();
    if options.track_names {
        add_track_name(&mut meta_track, "META");
    }
    if options.include_tempo && bpm > 0.0 {
        add_tempo(&mut meta_track, bpm);
    }
    meta_track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
    });
    add_end_of_track(&mut meta_track, 0);
    tracks.push(meta_track);

    for (kind, row) in pattern.rows.iter() {
        if row.hits() == 0 {
            continue;
        }
        tracks.push(create_row_track(kind, row, total_beats, scale, end_tick, options));
    }

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| MidiError::Write(e.to_string()))?;

    log::info!(
        "Exported pattern '{}' to MIDI: {} tracks, {} bytes",
        pattern.name,
        smf.tracks.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Absolute tick of every hit of a row within `total_beats`, in 480-per-beat ticks
fn hit_ticks(row: &RowPattern, total_beats: f64) -> Vec<u32> {
    let step = ticks_per_cell(row);
    if step == 0 {
        return Vec::new();
    }
    let total_ticks = (total_beats * TICKS_PER_BEAT as f64).round() as u32;
    let cells = row.cells.len() as u32;

    (0..total_ticks / step)
        .filter(|i| row.is_hit((i % cells) as usize))
        .map(|i| i * step)
        .collect()
}

fn create_row_track(
    kind: RowKind,
    row: &RowPattern,
    total_beats: f64,
    scale: f64,
    end_tick: u32,
    options: &MidiExportOptions,
) -> Track<'static> {
    let mut track = Track::new();
    let mut events: Vec<(u32, TrackEventKind<'static>)> = Vec::new();

    if options.track_names {
        events.push((0, TrackEventKind::Meta(MetaMessage::TrackName(kind.display_name().as_bytes()))));
    }

    let key = row_pitch(kind);
    let length = ((ticks_per_cell(row) as f64 * scale).round() as u32).max(1);
    for tick in hit_ticks(row, total_beats) {
        let tick_on = (tick as f64 * scale).round() as u32;
        events.push((
            tick_on,
            TrackEventKind::Midi {
                channel: options.channel.min(15).into(),
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: options.velocity.clamp(1, 127).into(),
                },
            },
        ));
        events.push((
            tick_on + length,
            TrackEventKind::Midi {
                channel: options.channel.min(15).into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    // Stable sort keeps a note-off ahead of a note-on sharing its tick
    events.sort_by_key(|(tick, _)| *tick);

    let mut last_tick = 0;
    for (tick, kind) in events {
        track.push(TrackEvent {
            delta: tick.saturating_sub(last_tick).into(),
            kind,
        });
        last_tick = tick;
    }

    add_end_of_track(&mut track, end_tick.saturating_sub(last_tick));
    track
}

fn add_track_name<'a>(track: &mut Track<'a>, name: &'a str) {
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    });
}

/// Add tempo meta message
fn add_tempo(track: &mut Track<'_>, bpm: f64) {
    // Microseconds per quarter note, 24-bit
    let us_per_quarter = ((60_000_000.0 / bpm) as u32).min(0x00FF_FFFF);
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.into())),
    });
}

fn add_end_of_track(track: &mut Track<'_>, delta: u32) {
    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
}
