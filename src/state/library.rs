// Pattern Library - Stored patterns plus the live-edit buffer of the open one
// The buffer is a deep copy; edits reach the library only through commit_live

use thiserror::Error;
use uuid::Uuid;

use crate::arranger::Arrangement;
use crate::pattern::PatternData;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibraryError {
    #[error("Pattern not found: {0}")]
    UnknownPattern(Uuid),
    #[error("Cannot delete the last pattern")]
    LastPattern,
    #[error("Pattern library is empty")]
    Empty,
}

pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Clone, PartialEq)]
pub struct PatternLibrary {
    patterns: Vec<PatternData>,
    current_id: Uuid,
    live: PatternData,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        PatternLibrary::new()
    }
}

impl PatternLibrary {
    /// A library holding one empty pattern, open for editing
    pub fn new() -> Self {
        let first = PatternData::new("Pattern 1");
        PatternLibrary {
            current_id: first.id,
            live: first.clone(),
            patterns: vec![first],
        }
    }

    /// Build from stored patterns. An unknown or missing `current_id` opens
    /// the first pattern.
    pub fn from_patterns(patterns: Vec<PatternData>, current_id: Option<Uuid>) -> LibraryResult<Self> {
        let first_id = patterns.first().map(|p| p.id).ok_or(LibraryError::Empty)?;

        let current_id = match current_id {
            Some(id) if patterns.iter().any(|p| p.id == id) => id,
            Some(id) => {
                log::warn!("Current pattern {} not in library, opening the first pattern", id);
                first_id
            }
            None => first_id,
        };

        let live = patterns
            .iter()
            .find(|p| p.id == current_id)
            .cloned()
            .ok_or(LibraryError::UnknownPattern(current_id))?;

        Ok(PatternLibrary {
            patterns,
            current_id,
            live,
        })
    }

    pub fn patterns(&self) -> &[PatternData] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn current_id(&self) -> Uuid {
        self.current_id
    }

    /// The pattern being edited
    pub fn live(&self) -> &PatternData {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut PatternData {
        &mut self.live
    }

    /// Stored version of a pattern (without uncommitted live edits)
    pub fn get(&self, id: Uuid) -> Option<&PatternData> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    fn index_of(&self, id: Uuid) -> LibraryResult<usize> {
        self.patterns
            .iter()
            .position(|p| p.id == id)
            .ok_or(LibraryError::UnknownPattern(id))
    }

    /// Write the live buffer back over its stored pattern
    pub fn commit_live(&mut self) {
        match self.patterns.iter_mut().find(|p| p.id == self.current_id) {
            Some(stored) => *stored = self.live.clone(),
            None => log::warn!("Live pattern {} has no stored entry", self.current_id),
        }
    }

    /// Stored patterns with the live buffer's edits applied
    pub fn snapshot(&self) -> Vec<PatternData> {
        self.patterns
            .iter()
            .map(|p| {
                if p.id == self.current_id {
                    self.live.clone()
                } else {
                    p.clone()
                }
            })
            .collect()
    }

    /// Open another pattern for editing. Pending edits are committed first.
    pub fn switch_to(&mut self, id: Uuid) -> LibraryResult<()> {
        let index = self.index_of(id)?;
        if id == self.current_id {
            return Ok(());
        }
        self.commit_live();
        self.live = self.patterns[index].clone();
        self.current_id = id;
        log::info!("Switched to pattern '{}' ({})", self.live.name, id);
        Ok(())
    }

    /// Append an empty pattern and open it
    pub fn new_pattern(&mut self, name: impl Into<String>) -> Uuid {
        let pattern = PatternData::new(name);
        let id = pattern.id;
        log::info!("Created pattern '{}' ({})", pattern.name, id);
        self.commit_live();
        self.live = pattern.clone();
        self.current_id = id;
        self.patterns.push(pattern);
        id
    }

    /// Copy a pattern (including live edits) right after the source.
    /// The open pattern does not change.
    pub fn duplicate(&mut self, id: Uuid) -> LibraryResult<Uuid> {
        let index = self.index_of(id)?;
        self.commit_live();

        let source = &self.patterns[index];
        let copy = source.duplicate(format!("{} copy", source.name));
        let copy_id = copy.id;
        log::info!("Duplicated pattern {} as {}", id, copy_id);
        self.patterns.insert(index + 1, copy);
        Ok(copy_id)
    }

    /// Delete a pattern and every clip that references it.
    ///
    /// The last pattern cannot be deleted. Deleting the open pattern opens the
    /// one that took its place (or the new last one). Returns the number of
    /// clips removed.
    pub fn delete(&mut self, id: Uuid, arrangement: &mut Arrangement) -> LibraryResult<usize> {
        let index = self.index_of(id)?;
        if self.patterns.len() <= 1 {
            return Err(LibraryError::LastPattern);
        }

        let removed = self.patterns.remove(index);
        let clips = arrangement.remove_clips_for_pattern(id);
        log::info!("Deleted pattern '{}' ({}), {} clips removed", removed.name, id, clips);

        if id == self.current_id {
            let next = &self.patterns[index.min(self.patterns.len() - 1)];
            self.current_id = next.id;
            self.live = next.clone();
        }
        Ok(clips)
    }

    pub fn rename(&mut self, id: Uuid, name: impl Into<String>) -> LibraryResult<()> {
        let index = self.index_of(id)?;
        let name = name.into();
        if id == self.current_id {
            self.live.name = name.clone();
        }
        self.patterns[index].name = name;
        Ok(())
    }
}
