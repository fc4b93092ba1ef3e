// Transport - Playback clock, loop region and audio sync

pub mod clock;
pub mod sync;

pub use clock::{rewind_into_loop, FrameInput, LoopRegion, PlayState, Transport, MAX_BPM, MIN_BPM};
pub use sync::{bar_to_seconds, seconds_per_bar, seconds_to_bar, AudioSync, BEATS_PER_BAR};
