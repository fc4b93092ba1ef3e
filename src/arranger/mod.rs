// Arranger - Timeline clips, stack transforms and per-frame layer resolution

pub mod clips;
pub mod resolve;
pub mod stacks;

// Re-export main types
pub use clips::{Arrangement, ArrangementClip, ArrangementError, ArrangementResult};
pub use resolve::{resolve_active, ActiveLayer};
pub use stacks::{StackSettings, StackSettingsMap};
