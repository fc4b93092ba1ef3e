// Visual and Synth Settings - Global scene parameters and per-pattern overrides
// Settings are scene parameters, not per-frame state

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Oscillator shape handed to the synth collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// Global scene parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Number of concentric rings
    pub num_circles: u32,

    /// Distance between neighbouring rings (scene units)
    pub circle_spacing: f64,

    /// Number of orbiting dots
    pub dot_count: u32,

    /// Ring spacings gained per full rotation while growth is on
    pub growth_rate: f64,

    /// Tilt radians per beat while tilt is on
    pub tilt_speed: f64,

    /// Scene rotation radians per beat while rotation is on
    pub rotation_speed: f64,

    /// Orbit radius at the primary / secondary endpoint
    pub radius_range: (f64, f64),

    /// Ring spread multiplier at the primary / secondary endpoint
    pub spread_range: (f64, f64),

    /// Line colour as a CSS-style hex string
    pub color: String,
}

impl Default for VisualSettings {
    fn default() -> Self {
        VisualSettings {
            num_circles: 8,
            circle_spacing: 20.0,
            dot_count: 4,
            growth_rate: 0.5,
            tilt_speed: PI / 8.0,
            rotation_speed: PI / 16.0,
            radius_range: (80.0, 160.0),
            spread_range: (1.0, 1.6),
            color: "#ffffff".to_string(),
        }
    }
}

impl VisualSettings {
    /// Total radial span covered by the rings
    pub fn ring_span(&self) -> f64 {
        self.num_circles as f64 * self.circle_spacing
    }

    /// Settings with a pattern's overrides applied
    pub fn merged(&self, overrides: Option<&VisualOverrides>) -> VisualSettings {
        let Some(o) = overrides else {
            return self.clone();
        };
        VisualSettings {
            num_circles: o.num_circles.unwrap_or(self.num_circles),
            circle_spacing: o.circle_spacing.unwrap_or(self.circle_spacing),
            dot_count: o.dot_count.unwrap_or(self.dot_count),
            growth_rate: o.growth_rate.unwrap_or(self.growth_rate),
            tilt_speed: o.tilt_speed.unwrap_or(self.tilt_speed),
            rotation_speed: o.rotation_speed.unwrap_or(self.rotation_speed),
            radius_range: o.radius_range.unwrap_or(self.radius_range),
            spread_range: o.spread_range.unwrap_or(self.spread_range),
            color: o.color.clone().unwrap_or_else(|| self.color.clone()),
        }
    }
}

/// Per-pattern visual overrides. Absent fields use the global value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_circles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Global synth parameters, passed through to the audio collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthSettings {
    pub waveform: Waveform,

    /// Output volume [0.0, 1.0]
    pub volume: f64,

    /// Envelope attack in seconds
    pub attack: f64,

    /// Envelope release in seconds
    pub release: f64,

    /// MIDI note the lowest row plays
    pub base_note: u8,

    pub muted: bool,
}

impl Default for SynthSettings {
    fn default() -> Self {
        SynthSettings {
            waveform: Waveform::Sine,
            volume: 0.5,
            attack: 0.01,
            release: 0.2,
            base_note: 48,
            muted: false,
        }
    }
}

impl SynthSettings {
    pub fn merged(&self, overrides: Option<&SynthOverrides>) -> SynthSettings {
        let Some(o) = overrides else {
            return self.clone();
        };
        SynthSettings {
            waveform: o.waveform.unwrap_or(self.waveform),
            volume: o.volume.unwrap_or(self.volume).clamp(0.0, 1.0),
            attack: o.attack.unwrap_or(self.attack),
            release: o.release.unwrap_or(self.release),
            base_note: o.base_note.unwrap_or(self.base_note),
            muted: o.muted.unwrap_or(self.muted),
        }
    }
}

/// Per-pattern synth overrides. Absent fields use the global value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Waveform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_note: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}
