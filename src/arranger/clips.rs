// Arrangement Clips - Pattern references placed on numbered stacks
// A clip points at a pattern by id; it never holds a copy of the pattern

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrangementError {
    #[error("Clip not found: {0}")]
    UnknownClip(Uuid),
    #[error("Clip length must be positive, got {0}")]
    InvalidLength(f64),
    #[error("Clip start bar must be a non-negative number, got {0}")]
    InvalidStartBar(f64),
}

pub type ArrangementResult<T> = Result<T, ArrangementError>;

/// A pattern placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementClip {
    pub id: Uuid,
    pub pattern_id: Uuid,

    /// Starting bar (may be fractional)
    pub start_bar: f64,

    /// Length in bars, always positive
    pub length: f64,

    /// Visual layer; higher stacks paint on top
    #[serde(default)]
    pub stack: u32,
}

impl ArrangementClip {
    pub fn new(pattern_id: Uuid, start_bar: f64, length: f64, stack: u32) -> ArrangementResult<Self> {
        validate_start(start_bar)?;
        validate_length(length)?;
        Ok(ArrangementClip {
            id: Uuid::new_v4(),
            pattern_id,
            start_bar,
            length,
            stack,
        })
    }

    pub fn end_bar(&self) -> f64 {
        self.start_bar + self.length
    }

    /// Half-open range check: `[start_bar, start_bar + length)`
    pub fn contains_bar(&self, bar: f64) -> bool {
        bar >= self.start_bar && bar < self.end_bar()
    }

    pub fn overlaps(&self, other: &ArrangementClip) -> bool {
        self.stack == other.stack
            && self.start_bar < other.end_bar()
            && other.start_bar < self.end_bar()
    }
}

fn validate_start(start_bar: f64) -> ArrangementResult<()> {
    if start_bar.is_finite() && start_bar >= 0.0 {
        Ok(())
    } else {
        Err(ArrangementError::InvalidStartBar(start_bar))
    }
}

fn validate_length(length: f64) -> ArrangementResult<()> {
    if length.is_finite() && length > 0.0 {
        Ok(())
    } else {
        Err(ArrangementError::InvalidLength(length))
    }
}

fn default_enabled() -> bool {
    true
}

/// The timeline: clips in insertion order plus the arrangement-mode switch.
///
/// Clips on the same stack should not overlap. The model does not forbid it;
/// lookups return the first matching clip in clip order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    #[serde(default)]
    pub clips: Vec<ArrangementClip>,

    /// Arrangement mode; when off only the live pattern plays
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for Arrangement {
    fn default() -> Self {
        Arrangement {
            clips: Vec::new(),
            enabled: default_enabled(),
        }
    }
}

impl Arrangement {
    /// Whether clips drive the visuals this frame
    pub fn is_active(&self) -> bool {
        self.enabled && !self.clips.is_empty()
    }

    /// Bar at which the last clip ends
    pub fn length_bars(&self) -> f64 {
        self.clips.iter().map(|c| c.end_bar()).fold(0.0, f64::max)
    }

    /// Stack indices in use, ascending
    pub fn stacks(&self) -> Vec<u32> {
        self.clips
            .iter()
            .map(|c| c.stack)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn clips_on_stack(&self, stack: u32) -> impl Iterator<Item = &ArrangementClip> {
        self.clips.iter().filter(move |c| c.stack == stack)
    }

    /// First clip on a stack covering `bar`
    pub fn active_clip_on_stack(&self, stack: u32, bar: f64) -> Option<&ArrangementClip> {
        self.clips_on_stack(stack).find(|c| c.contains_bar(bar))
    }

    pub fn get(&self, clip_id: Uuid) -> Option<&ArrangementClip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    fn get_mut(&mut self, clip_id: Uuid) -> ArrangementResult<&mut ArrangementClip> {
        self.clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or(ArrangementError::UnknownClip(clip_id))
    }

    /// Pairs of clip ids that overlap on the same stack
    pub fn overlapping_clips(&self) -> Vec<(Uuid, Uuid)> {
        let mut pairs = Vec::new();
        for (i, a) in self.clips.iter().enumerate() {
            for b in &self.clips[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    fn warn_on_overlap(&self, clip_id: Uuid) {
        if let Some(clip) = self.get(clip_id) {
            if self.clips.iter().any(|c| c.id != clip_id && c.overlaps(clip)) {
                log::warn!(
                    "Clip {} overlaps another clip on stack {}; the earlier clip wins",
                    clip_id,
                    clip.stack
                );
            }
        }
    }

    /// Place a pattern on the timeline
    pub fn add_clip(
        &mut self,
        pattern_id: Uuid,
        start_bar: f64,
        length: f64,
        stack: u32,
    ) -> ArrangementResult<Uuid> {
        let clip = ArrangementClip::new(pattern_id, start_bar, length, stack)?;
        let id = clip.id;
        self.clips.push(clip);
        log::info!("Added clip {} for pattern {} at bar {} on stack {}", id, pattern_id, start_bar, stack);
        self.warn_on_overlap(id);
        Ok(id)
    }

    /// Drag-move a clip to a new start bar and stack
    pub fn move_clip(&mut self, clip_id: Uuid, start_bar: f64, stack: u32) -> ArrangementResult<()> {
        validate_start(start_bar)?;
        let clip = self.get_mut(clip_id)?;
        clip.start_bar = start_bar;
        clip.stack = stack;
        self.warn_on_overlap(clip_id);
        Ok(())
    }

    pub fn resize_clip(&mut self, clip_id: Uuid, length: f64) -> ArrangementResult<()> {
        validate_length(length)?;
        self.get_mut(clip_id)?.length = length;
        self.warn_on_overlap(clip_id);
        Ok(())
    }

    /// Copy a clip to start right where it ends, on the same stack
    pub fn duplicate_clip(&mut self, clip_id: Uuid) -> ArrangementResult<Uuid> {
        let source = self
            .get(clip_id)
            .ok_or(ArrangementError::UnknownClip(clip_id))?;
        let (pattern_id, start, length, stack) =
            (source.pattern_id, source.end_bar(), source.length, source.stack);
        self.add_clip(pattern_id, start, length, stack)
    }

    pub fn remove_clip(&mut self, clip_id: Uuid) -> ArrangementResult<ArrangementClip> {
        let index = self
            .clips
            .iter()
            .position(|c| c.id == clip_id)
            .ok_or(ArrangementError::UnknownClip(clip_id))?;
        Ok(self.clips.remove(index))
    }

    /// Cascade delete for a removed pattern. Returns the number of clips removed.
    pub fn remove_clips_for_pattern(&mut self, pattern_id: Uuid) -> usize {
        let before = self.clips.len();
        self.clips.retain(|c| c.pattern_id != pattern_id);
        let removed = before - self.clips.len();
        if removed > 0 {
            log::info!("Removed {} clips referencing pattern {}", removed, pattern_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_contains_bar() {
        let clip = ArrangementClip::new(Uuid::new_v4(), 4.0, 4.0, 0).unwrap();
        assert!(!clip.contains_bar(3.99));
        assert!(clip.contains_bar(4.0));
        assert!(clip.contains_bar(7.5));
        assert!(!clip.contains_bar(8.0));
    }

    #[test]
    fn test_invalid_clip() {
        assert_eq!(
            ArrangementClip::new(Uuid::new_v4(), 0.0, 0.0, 0),
            Err(ArrangementError::InvalidLength(0.0))
        );
        assert!(ArrangementClip::new(Uuid::new_v4(), -1.0, 2.0, 0).is_err());
        assert!(ArrangementClip::new(Uuid::new_v4(), 0.0, f64::NAN, 0).is_err());
    }

    #[test]
    fn test_length_and_stacks() {
        let mut arrangement = Arrangement::default();
        assert_eq!(arrangement.length_bars(), 0.0);
        assert!(!arrangement.is_active());

        let pattern = Uuid::new_v4();
        arrangement.add_clip(pattern, 0.0, 4.0, 2).unwrap();
        arrangement.add_clip(pattern, 2.0, 8.5, 0).unwrap();
        assert_eq!(arrangement.length_bars(), 10.5);
        assert_eq!(arrangement.stacks(), vec![0, 2]);
        assert!(arrangement.is_active());

        arrangement.enabled = false;
        assert!(!arrangement.is_active());
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let mut arrangement = Arrangement::default();
        let first = arrangement.add_clip(Uuid::new_v4(), 0.0, 4.0, 1).unwrap();
        let second = arrangement.add_clip(Uuid::new_v4(), 2.0, 4.0, 1).unwrap();

        assert_eq!(arrangement.active_clip_on_stack(1, 3.0).unwrap().id, first);
        assert_eq!(arrangement.active_clip_on_stack(1, 5.0).unwrap().id, second);
        assert_eq!(arrangement.overlapping_clips(), vec![(first, second)]);
    }

    #[test]
    fn test_duplicate_places_after_source() {
        let mut arrangement = Arrangement::default();
        let pattern = Uuid::new_v4();
        let id = arrangement.add_clip(pattern, 1.0, 2.0, 3).unwrap();
        let copy = arrangement.duplicate_clip(id).unwrap();

        let clip = arrangement.get(copy).unwrap();
        assert_eq!(clip.start_bar, 3.0);
        assert_eq!(clip.length, 2.0);
        assert_eq!(clip.stack, 3);
        assert_eq!(clip.pattern_id, pattern);
        assert!(arrangement.overlapping_clips().is_empty());
    }

    #[test]
    fn test_move_and_remove() {
        let mut arrangement = Arrangement::default();
        let id = arrangement.add_clip(Uuid::new_v4(), 0.0, 2.0, 0).unwrap();
        arrangement.move_clip(id, 6.0, 4).unwrap();
        assert_eq!(arrangement.get(id).unwrap().start_bar, 6.0);
        assert_eq!(arrangement.get(id).unwrap().stack, 4);

        assert!(arrangement.move_clip(Uuid::new_v4(), 0.0, 0).is_err());
        assert!(arrangement.remove_clip(id).is_ok());
        assert_eq!(arrangement.remove_clip(id), Err(ArrangementError::UnknownClip(id)));
    }

    #[test]
    fn test_cascade_remove() {
        let mut arrangement = Arrangement::default();
        let doomed = Uuid::new_v4();
        let kept = Uuid::new_v4();
        arrangement.add_clip(doomed, 0.0, 1.0, 0).unwrap();
        arrangement.add_clip(kept, 1.0, 1.0, 0).unwrap();
        arrangement.add_clip(doomed, 2.0, 1.0, 1).unwrap();

        assert_eq!(arrangement.remove_clips_for_pattern(doomed), 2);
        assert_eq!(arrangement.clips.len(), 1);
        assert_eq!(arrangement.clips[0].pattern_id, kept);
    }
}
