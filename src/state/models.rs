// Data models for the persisted project
// RhythmData is the whole editable state; it is loaded and saved as one JSON document
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::library::{LibraryError, PatternLibrary};
use crate::arranger::{Arrangement, StackSettingsMap};
use crate::pattern::PatternData;
use crate::transport::{LoopRegion, MAX_BPM, MIN_BPM};
use crate::visual::{SynthSettings, VisualSettings};

/// Format version written by this crate
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported project version {0}")]
    UnsupportedVersion(u32),
    #[error("Tempo must be between 20 and 300 BPM, got {0}")]
    InvalidBpm(f64),
    #[error("Clip {clip} has non-positive length {length}")]
    InvalidClipLength { clip: Uuid, length: f64 },
    #[error("Pattern library: {0}")]
    Library(#[from] LibraryError),
}

pub type LoadResult<T> = Result<T, LoadError>;

fn default_version() -> u32 {
    CURRENT_VERSION
}

/// Tempo, loop and audio alignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub bpm: f64,
    pub loop_region: LoopRegion,

    /// Seconds added to engine time to get the audio element's time
    pub sync_offset: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        PlaybackSettings {
            bpm: 120.0,
            loop_region: LoopRegion::default(),
            sync_offset: 0.0,
        }
    }
}

/// On-disk shape of [`RhythmData`]. Every section is optional.
#[derive(Debug, Serialize, Deserialize)]
struct RhythmRecord {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    patterns: Vec<PatternData>,
    #[serde(default)]
    current_pattern_id: Option<Uuid>,
    #[serde(default)]
    arrangement: Arrangement,
    #[serde(default)]
    stack_settings: StackSettingsMap,
    #[serde(default)]
    visual: VisualSettings,
    #[serde(default)]
    synth: SynthSettings,
    #[serde(default)]
    playback: PlaybackSettings,
}

/// Complete editable state of one project
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RhythmData {
    pub saved_at: Option<DateTime<Utc>>,
    pub library: PatternLibrary,
    pub arrangement: Arrangement,
    pub stacks: StackSettingsMap,
    pub visual: VisualSettings,
    pub synth: SynthSettings,
    pub playback: PlaybackSettings,
}

impl RhythmData {
    /// Parse and validate a project document.
    ///
    /// Missing sections take their defaults and rows are resized to match
    /// their configuration. Clips on unknown patterns are dropped. A newer
    /// version, a non-positive tempo, a non-positive clip length or an empty
    /// pattern list is an error.
    pub fn from_json(json: &str) -> LoadResult<Self> {
        let record: RhythmRecord = serde_json::from_str(json)?;

        if record.version > CURRENT_VERSION {
            return Err(LoadError::UnsupportedVersion(record.version));
        }

        let bpm = record.playback.bpm;
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(LoadError::InvalidBpm(bpm));
        }

        if let Some(clip) = record
            .arrangement
            .clips
            .iter()
            .find(|c| !(c.length.is_finite() && c.length > 0.0))
        {
            return Err(LoadError::InvalidClipLength {
                clip: clip.id,
                length: clip.length,
            });
        }

        let mut patterns = record.patterns;
        for pattern in &mut patterns {
            let fixed = pattern.rows.normalize();
            if !fixed.is_empty() {
                log::warn!("Pattern '{}': resized rows {:?} to match their length", pattern.name, fixed);
            }
        }

        let mut arrangement = record.arrangement;
        let before = arrangement.clips.len();
        arrangement
            .clips
            .retain(|c| patterns.iter().any(|p| p.id == c.pattern_id));
        if arrangement.clips.len() < before {
            log::warn!("Dropped {} clips referencing unknown patterns", before - arrangement.clips.len());
        }

        let library = PatternLibrary::from_patterns(patterns, record.current_pattern_id)?;

        log::info!(
            "Loaded project: {} patterns, {} clips, {} BPM",
            library.len(),
            arrangement.clips.len(),
            bpm
        );

        Ok(RhythmData {
            saved_at: record.saved_at,
            library,
            arrangement,
            stacks: record.stack_settings,
            visual: record.visual,
            synth: record.synth,
            playback: record.playback,
        })
    }

    /// Pretty-printed document, live edits included
    pub fn to_json(&self) -> LoadResult<String> {
        let record = RhythmRecord {
            version: CURRENT_VERSION,
            saved_at: self.saved_at,
            patterns: self.library.snapshot(),
            current_pattern_id: Some(self.library.current_id()),
            arrangement: self.arrangement.clone(),
            stack_settings: self.stacks.clone(),
            visual: self.visual.clone(),
            synth: self.synth.clone(),
            playback: self.playback,
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::StackSettings;
    use crate::pattern::{BaseLength, RowKind};

    #[test]
    fn test_minimal_document_uses_defaults() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"patterns":[{{"id":"{}","name":"Only"}}]}}"#, id);
        let data = RhythmData::from_json(&json).unwrap();

        assert_eq!(data.library.current_id(), id);
        assert_eq!(data.playback.bpm, 120.0);
        assert!(!data.playback.loop_region.enabled);
        assert_eq!(data.stacks.get(3), StackSettings::IDENTITY);
        assert_eq!(data.library.live().rows.flip_y.cells.len(), 16);
        assert_eq!(data.library.live().bars, 4);
    }

    #[test]
    fn test_rows_normalized_on_load() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"patterns":[{{"id":"{}","rows":{{"tilt":{{"cells":[true,false],"base_length":4,"subdivision":1}}}}}}]}}"#,
            id
        );
        let data = RhythmData::from_json(&json).unwrap();
        let tilt = data.library.live().rows.row(RowKind::Tilt);
        assert_eq!(tilt.base_length, BaseLength::Four);
        assert_eq!(tilt.cells, vec![true, true, false, false]);
    }

    #[test]
    fn test_tempo_outside_transport_range_rejected() {
        let id = Uuid::new_v4();
        let with_bpm = |bpm: &str| {
            format!(r#"{{"patterns":[{{"id":"{}"}}],"playback":{{"bpm":{}}}}}"#, id, bpm)
        };

        for bpm in ["10", "19.5", "300.5", "400"] {
            assert!(
                matches!(RhythmData::from_json(&with_bpm(bpm)), Err(LoadError::InvalidBpm(_))),
                "bpm {}",
                bpm
            );
        }
        assert_eq!(RhythmData::from_json(&with_bpm("20")).unwrap().playback.bpm, 20.0);
        assert_eq!(RhythmData::from_json(&with_bpm("300")).unwrap().playback.bpm, 300.0);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(RhythmData::from_json("{}"), Err(LoadError::Library(LibraryError::Empty))));
        assert!(matches!(RhythmData::from_json("not json"), Err(LoadError::Json(_))));

        let id = Uuid::new_v4();
        let with = |extra: &str| format!(r#"{{"patterns":[{{"id":"{}"}}],{}}}"#, id, extra);

        assert!(matches!(
            RhythmData::from_json(&with(r#""version":2"#)),
            Err(LoadError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            RhythmData::from_json(&with(r#""playback":{"bpm":0}"#)),
            Err(LoadError::InvalidBpm(_))
        ));
        let clip = format!(
            r#""arrangement":{{"clips":[{{"id":"{}","pattern_id":"{}","start_bar":0,"length":0}}]}}"#,
            Uuid::new_v4(),
            id
        );
        assert!(matches!(
            RhythmData::from_json(&with(&clip)),
            Err(LoadError::InvalidClipLength { .. })
        ));
        // Unsupported base length is rejected by the row parser
        let bad = format!(
            r#"{{"patterns":[{{"id":"{}","rows":{{"tilt":{{"cells":[],"base_length":5,"subdivision":1}}}}}}]}}"#,
            id
        );
        assert!(matches!(RhythmData::from_json(&bad), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_clips_on_unknown_patterns_dropped() {
        let mut data = RhythmData::default();
        let id = data.library.current_id();
        data.arrangement.add_clip(id, 0.0, 4.0, 0).unwrap();
        data.arrangement.add_clip(Uuid::new_v4(), 4.0, 4.0, 0).unwrap();

        let loaded = RhythmData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(loaded.arrangement.clips.len(), 1);
        assert_eq!(loaded.arrangement.clips[0].pattern_id, id);
    }

    #[test]
    fn test_to_json_includes_live_edits() {
        let mut data = RhythmData::default();
        data.library.live_mut().rows.direction.set_cell(4, true);
        data.stacks.set(2, StackSettings { flip_y: true, ..StackSettings::IDENTITY });
        data.playback.bpm = 96.0;

        let json = data.to_json().unwrap();
        assert!(json.contains("\"version\": 1"));

        let loaded = RhythmData::from_json(&json).unwrap();
        assert!(loaded.library.get(loaded.library.current_id()).unwrap().rows.direction.is_hit(4));
        assert!(loaded.stacks.get(2).flip_y);
        assert_eq!(loaded.playback.bpm, 96.0);
    }
}
