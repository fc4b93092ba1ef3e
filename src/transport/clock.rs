// Transport Clock - Play/pause state, elapsed time and loop rewinding
// Elapsed seconds is the single authoritative time value; everything else derives from it

use serde::{Deserialize, Serialize};

use super::sync::{bar_to_seconds, BEATS_PER_BAR};

/// Reasonable tempo range
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
}

/// Loop region in bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopRegion {
    pub enabled: bool,
    pub start: f64,
    pub end: f64,
}

impl Default for LoopRegion {
    fn default() -> Self {
        LoopRegion {
            enabled: false,
            start: 0.0,
            end: 4.0,
        }
    }
}

impl LoopRegion {
    /// Looping only applies to a non-empty region
    pub fn is_active(&self) -> bool {
        self.enabled && self.end > self.start
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Fold a bar position that reached the loop end back into the loop.
/// Positions before `end` are returned unchanged.
pub fn rewind_into_loop(bar: f64, start: f64, end: f64) -> f64 {
    if end <= start || bar < end {
        return bar;
    }
    let overshoot = bar - end;
    start + overshoot.rem_euclid(end - start)
}

/// Immutable per-frame timing snapshot handed to the calculators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameInput {
    pub elapsed_seconds: f64,
    pub beats_elapsed: f64,
    pub current_bar: f64,

    /// Bar used for arrangement lookup, after loop/arrangement wrapping
    pub effective_bar: f64,

    pub playing: bool,
}

impl FrameInput {
    /// Snapshot for a fixed point in time, e.g. when scrubbing
    pub fn at_seconds(elapsed_seconds: f64, bpm: f64) -> Self {
        let beats_elapsed = elapsed_seconds * bpm / 60.0;
        let current_bar = beats_elapsed / BEATS_PER_BAR;
        FrameInput {
            elapsed_seconds,
            beats_elapsed,
            current_bar,
            effective_bar: current_bar,
            playing: false,
        }
    }
}

/// Frame-driven playback clock
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    state: PlayState,
    elapsed_seconds: f64,
    bpm: f64,
    loop_region: LoopRegion,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::new(120.0)
    }
}

impl Transport {
    pub fn new(bpm: f64) -> Self {
        Transport {
            state: PlayState::Paused,
            elapsed_seconds: 0.0,
            bpm: clamp_bpm(bpm),
            loop_region: LoopRegion::default(),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Resume accumulating from the current position
    pub fn play(&mut self) {
        self.state = PlayState::Playing;
    }

    /// Freeze the current position
    pub fn pause(&mut self) {
        self.state = PlayState::Paused;
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlayState::Playing => self.pause(),
            PlayState::Paused => self.play(),
        }
    }

    /// Pause and return to the loop start (when looping) or the beginning
    pub fn stop(&mut self) {
        self.state = PlayState::Paused;
        self.elapsed_seconds = if self.loop_region.is_active() {
            bar_to_seconds(self.loop_region.start, self.bpm)
        } else {
            0.0
        };
        log::debug!("Transport stopped at {:.3}s", self.elapsed_seconds);
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Change tempo, keeping the current bar position
    pub fn set_bpm(&mut self, bpm: f64) {
        let bar = self.current_bar();
        self.bpm = clamp_bpm(bpm);
        self.elapsed_seconds = bar_to_seconds(bar, self.bpm);
    }

    pub fn loop_region(&self) -> LoopRegion {
        self.loop_region
    }

    pub fn set_loop_region(&mut self, region: LoopRegion) {
        self.loop_region = region;
        self.apply_loop();
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_region.enabled = enabled;
        self.apply_loop();
    }

    pub fn beats_elapsed(&self) -> f64 {
        self.elapsed_seconds * self.bpm / 60.0
    }

    pub fn current_bar(&self) -> f64 {
        self.beats_elapsed() / BEATS_PER_BAR
    }

    /// Jump to a bar position (negative positions clamp to 0)
    pub fn seek_bar(&mut self, bar: f64) {
        self.elapsed_seconds = bar_to_seconds(bar.max(0.0), self.bpm);
        self.apply_loop();
    }

    /// Advance by one frame. Returns true if the loop rewound the position.
    pub fn advance(&mut self, frame_delta: f64) -> bool {
        if !self.is_playing() || !frame_delta.is_finite() {
            return false;
        }
        self.elapsed_seconds += frame_delta.max(0.0);
        self.apply_loop()
    }

    /// Rewrite elapsed time when the loop end was reached
    fn apply_loop(&mut self) -> bool {
        if !self.loop_region.is_active() {
            return false;
        }
        let bar = self.current_bar();
        if bar < self.loop_region.end {
            return false;
        }
        let rewound = rewind_into_loop(bar, self.loop_region.start, self.loop_region.end);
        self.elapsed_seconds = bar_to_seconds(rewound, self.bpm);
        log::debug!("Loop rewound bar {:.3} -> {:.3}", bar, rewound);
        true
    }

    /// Bar used for arrangement lookup.
    ///
    /// While looping the raw bar is used; otherwise an active arrangement
    /// wraps the position to its length.
    pub fn effective_bar(&self, arrangement_length: f64, use_arrangement: bool) -> f64 {
        let bar = self.current_bar();
        if self.loop_region.enabled {
            bar
        } else if use_arrangement && arrangement_length > 0.0 {
            bar.rem_euclid(arrangement_length)
        } else {
            bar
        }
    }

    /// Playhead as a fraction [0.0, 1.0) of the arrangement
    pub fn playhead_fraction(&self, arrangement_length: f64) -> f64 {
        if arrangement_length <= 0.0 {
            return 0.0;
        }
        self.current_bar().rem_euclid(arrangement_length) / arrangement_length
    }

    /// Build the immutable snapshot for this frame
    pub fn frame_input(&self, arrangement_length: f64, use_arrangement: bool) -> FrameInput {
        FrameInput {
            elapsed_seconds: self.elapsed_seconds,
            beats_elapsed: self.beats_elapsed(),
            current_bar: self.current_bar(),
            effective_bar: self.effective_bar(arrangement_length, use_arrangement),
            playing: self.is_playing(),
        }
    }
}

fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_finite() {
        bpm.clamp(MIN_BPM, MAX_BPM)
    } else {
        120.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewind_single_overshoot() {
        assert!((rewind_into_loop(4.3, 0.0, 4.0) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_rewind_double_overshoot() {
        assert!((rewind_into_loop(9.1, 0.0, 4.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_rewind_inside_loop_unchanged() {
        assert_eq!(rewind_into_loop(2.5, 0.0, 4.0), 2.5);
        assert_eq!(rewind_into_loop(6.0, 4.0, 4.0), 6.0);
    }

    #[test]
    fn test_paused_does_not_advance() {
        let mut transport = Transport::new(120.0);
        transport.advance(1.0);
        assert_eq!(transport.elapsed_seconds(), 0.0);

        transport.play();
        transport.advance(1.0);
        transport.pause();
        transport.advance(1.0);
        assert_eq!(transport.elapsed_seconds(), 1.0);

        // Resuming continues from the frozen value
        transport.play();
        transport.advance(0.5);
        assert_eq!(transport.elapsed_seconds(), 1.5);
    }

    #[test]
    fn test_bar_math() {
        let mut transport = Transport::new(120.0);
        transport.play();
        transport.advance(2.0);
        // 120 BPM: 2 seconds = 4 beats = 1 bar
        assert!((transport.beats_elapsed() - 4.0).abs() < 1e-9);
        assert!((transport.current_bar() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_advance_rewinds_loop() {
        let mut transport = Transport::new(120.0);
        transport.set_loop_region(LoopRegion {
            enabled: true,
            start: 0.0,
            end: 4.0,
        });
        transport.play();
        // 4.3 bars at 2 seconds per bar
        let rewound = transport.advance(8.6);
        assert!(rewound);
        assert!((transport.current_bar() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_loop_with_offset_start() {
        let mut transport = Transport::new(120.0);
        transport.set_loop_region(LoopRegion {
            enabled: true,
            start: 2.0,
            end: 4.0,
        });
        transport.seek_bar(5.5);
        assert!((transport.current_bar() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_stop_returns_to_loop_start() {
        let mut transport = Transport::new(90.0);
        transport.set_loop_region(LoopRegion {
            enabled: true,
            start: 2.0,
            end: 6.0,
        });
        transport.seek_bar(3.0);
        transport.play();
        transport.stop();
        assert!(!transport.is_playing());
        assert!((transport.current_bar() - 2.0).abs() < 1e-9);

        transport.set_loop_enabled(false);
        transport.stop();
        assert_eq!(transport.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_effective_bar() {
        let mut transport = Transport::new(120.0);
        transport.seek_bar(10.5);
        assert!((transport.effective_bar(8.0, true) - 2.5).abs() < 1e-9);
        assert!((transport.effective_bar(8.0, false) - 10.5).abs() < 1e-9);
        assert!((transport.effective_bar(0.0, true) - 10.5).abs() < 1e-9);

        // Looping uses the raw bar even with an arrangement
        transport.set_loop_region(LoopRegion {
            enabled: true,
            start: 8.0,
            end: 12.0,
        });
        assert!((transport.effective_bar(8.0, true) - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_set_bpm_keeps_bar() {
        let mut transport = Transport::new(120.0);
        transport.seek_bar(3.0);
        transport.set_bpm(60.0);
        assert!((transport.current_bar() - 3.0).abs() < 1e-9);
        assert!((transport.elapsed_seconds() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_bpm_clamped() {
        assert_eq!(Transport::new(1000.0).bpm(), MAX_BPM);
        assert_eq!(Transport::new(0.0).bpm(), MIN_BPM);
        assert_eq!(Transport::new(f64::NAN).bpm(), 120.0);
    }

    #[test]
    fn test_frame_input_snapshot() {
        let mut transport = Transport::new(120.0);
        transport.play();
        transport.advance(3.0);
        let input = transport.frame_input(1.0, true);
        assert!(input.playing);
        assert!((input.beats_elapsed - 6.0).abs() < 1e-9);
        assert!((input.current_bar - 1.5).abs() < 1e-9);
        assert!((input.effective_bar - 0.5).abs() < 1e-9);
        assert!((transport.playhead_fraction(2.0) - 0.75).abs() < 1e-9);
    }
}
