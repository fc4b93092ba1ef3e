// Edit History - One step of undo and one step of redo
use super::models::RhythmData;

#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo: Option<RhythmData>,
    redo: Option<RhythmData>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `current` as the undo target before an edit.
    /// Any pending redo is discarded.
    pub fn checkpoint(&mut self, current: &RhythmData) {
        self.undo = Some(current.clone());
        self.redo = None;
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.redo.is_some()
    }

    /// Restore the checkpoint. Returns false when there is nothing to undo.
    pub fn undo(&mut self, current: &mut RhythmData) -> bool {
        match self.undo.take() {
            Some(previous) => {
                self.redo = Some(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, current: &mut RhythmData) -> bool {
        match self.redo.take() {
            Some(next) => {
                self.undo = Some(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }
}
