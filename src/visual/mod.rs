// Visual State - Scene settings, effect accumulators and per-frame orbit state

pub mod effects;
pub mod frame;
pub mod settings;

pub use effects::{flip_y, growth_offset, rotation_angle, tilt_angle, BEATS_PER_ROTATION};
pub use frame::{compose_layers, compute_orbit_frame, LayerFrame, OrbitFrame};
pub use settings::{SynthOverrides, SynthSettings, VisualOverrides, VisualSettings, Waveform};
