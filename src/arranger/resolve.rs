// Arrangement Resolver - Which pattern plays on which stack at a bar
// Live edits to the open pattern are visible on the timeline before they are saved

use uuid::Uuid;

use super::clips::{Arrangement, ArrangementClip};
use super::stacks::{StackSettings, StackSettingsMap};
use crate::pattern::{Instrument, PatternData, PatternRows};
use crate::visual::settings::{SynthOverrides, VisualOverrides};

/// One stack's pattern for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLayer<'a> {
    pub stack: u32,
    pub transform: StackSettings,
    pub pattern_id: Uuid,

    /// Clip that selected this layer; `None` for the synthetic live layer
    pub clip_id: Option<Uuid>,

    pub rows: &'a PatternRows,
    pub instrument: Instrument,
    pub bars: u32,
    pub visual: Option<&'a VisualOverrides>,
    pub synth: Option<&'a SynthOverrides>,

    /// Whether the rows came from the live-edit buffer
    pub live: bool,
}

impl<'a> ActiveLayer<'a> {
    /// The live-edit buffer played on its own at stack 0
    pub fn live_only(live: &'a PatternData) -> Self {
        ActiveLayer {
            stack: 0,
            transform: StackSettings::IDENTITY,
            pattern_id: live.id,
            clip_id: None,
            rows: &live.rows,
            instrument: live.instrument,
            bars: live.bars,
            visual: live.visual.as_ref(),
            synth: live.synth.as_ref(),
            live: true,
        }
    }

    fn from_clip(
        clip: &ArrangementClip,
        stored: &'a PatternData,
        live: Option<&'a PatternData>,
        transform: StackSettings,
    ) -> Self {
        match live {
            // Rows and instrument from the live buffer, stored length kept,
            // overrides from the buffer when it carries them
            Some(live) => ActiveLayer {
                stack: clip.stack,
                transform,
                pattern_id: stored.id,
                clip_id: Some(clip.id),
                rows: &live.rows,
                instrument: live.instrument,
                bars: stored.bars,
                visual: live.visual.as_ref().or(stored.visual.as_ref()),
                synth: live.synth.as_ref().or(stored.synth.as_ref()),
                live: true,
            },
            None => ActiveLayer {
                stack: clip.stack,
                transform,
                pattern_id: stored.id,
                clip_id: Some(clip.id),
                rows: &stored.rows,
                instrument: stored.instrument,
                bars: stored.bars,
                visual: stored.visual.as_ref(),
                synth: stored.synth.as_ref(),
                live: false,
            },
        }
    }
}

/// Resolve the active layers at `effective_bar`, ordered by ascending stack.
///
/// With arrangement mode off or no clips, the live buffer plays alone at
/// stack 0 with the identity transform. A bar no clip covers resolves to
/// nothing, which is not an error.
pub fn resolve_active<'a>(
    effective_bar: f64,
    arrangement: &Arrangement,
    patterns: &'a [PatternData],
    stacks: &StackSettingsMap,
    edited_id: Option<Uuid>,
    live: &'a PatternData,
) -> Vec<ActiveLayer<'a>> {
    if !arrangement.is_active() {
        return vec![ActiveLayer::live_only(live)];
    }

    arrangement
        .stacks()
        .into_iter()
        .filter_map(|stack| arrangement.active_clip_on_stack(stack, effective_bar))
        .filter_map(|clip| {
            let Some(stored) = patterns.iter().find(|p| p.id == clip.pattern_id) else {
                log::debug!("Clip {} references missing pattern {}", clip.id, clip.pattern_id);
                return None;
            };
            let live_rows = (edited_id == Some(stored.id)).then_some(live);
            Some(ActiveLayer::from_clip(clip, stored, live_rows, stacks.get(clip.stack)))
        })
        .collect()
}
