// Audio Sync - Bar/seconds conversions shared with the audio element
// The audio transport is external; it must stay consistent with these mappings

use serde::{Deserialize, Serialize};

/// Bars are always four beats
pub const BEATS_PER_BAR: f64 = 4.0;

/// Seconds per bar at a tempo. Non-positive tempos yield 0.
pub fn seconds_per_bar(bpm: f64) -> f64 {
    if bpm <= 0.0 {
        return 0.0;
    }
    60.0 / bpm * BEATS_PER_BAR
}

pub fn bar_to_seconds(bar: f64, bpm: f64) -> f64 {
    bar * seconds_per_bar(bpm)
}

pub fn seconds_to_bar(seconds: f64, bpm: f64) -> f64 {
    let per_bar = seconds_per_bar(bpm);
    if per_bar <= 0.0 {
        return 0.0;
    }
    seconds / per_bar
}

/// Offset between engine time and the audio element's `currentTime`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioSync {
    /// Seconds added to engine time to get audio time
    pub sync_offset: f64,
}

impl AudioSync {
    pub fn new(sync_offset: f64) -> Self {
        AudioSync { sync_offset }
    }

    /// Audio `currentTime` matching an engine elapsed time (never negative)
    pub fn audio_time_for(&self, elapsed_seconds: f64) -> f64 {
        (elapsed_seconds + self.sync_offset).max(0.0)
    }

    /// Engine elapsed time matching an audio `currentTime`
    pub fn elapsed_for_audio_time(&self, audio_time: f64) -> f64 {
        (audio_time - self.sync_offset).max(0.0)
    }

    /// How far the audio is ahead (positive) or behind (negative) the engine
    pub fn drift(&self, elapsed_seconds: f64, audio_time: f64) -> f64 {
        audio_time - self.audio_time_for(elapsed_seconds)
    }

    pub fn needs_resync(&self, elapsed_seconds: f64, audio_time: f64, tolerance: f64) -> bool {
        self.drift(elapsed_seconds, audio_time).abs() > tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_per_bar() {
        // At 120 BPM a beat is 0.5s, a bar 2s
        assert!((seconds_per_bar(120.0) - 2.0).abs() < 1e-9);
        assert_eq!(seconds_per_bar(0.0), 0.0);
    }

    #[test]
    fn test_bar_seconds_inverse() {
        for bpm in [60.0, 97.5, 140.0] {
            let seconds = bar_to_seconds(7.25, bpm);
            assert!((seconds_to_bar(seconds, bpm) - 7.25).abs() < 1e-9);
        }
        assert_eq!(seconds_to_bar(10.0, -5.0), 0.0);
    }

    #[test]
    fn test_sync_offset() {
        let sync = AudioSync::new(0.25);
        assert!((sync.audio_time_for(2.0) - 2.25).abs() < 1e-9);
        assert!((sync.elapsed_for_audio_time(2.25) - 2.0).abs() < 1e-9);
        assert_eq!(AudioSync::new(-1.0).audio_time_for(0.5), 0.0);
    }

    #[test]
    fn test_drift() {
        let sync = AudioSync::new(0.1);
        assert!((sync.drift(1.0, 1.15) - 0.05).abs() < 1e-9);
        assert!(!sync.needs_resync(1.0, 1.15, 0.08));
        assert!(sync.needs_resync(1.0, 1.3, 0.08));
    }
}
