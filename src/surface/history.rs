use crate::markup::Node;

/// Maximum number of undo steps kept.
const HISTORY_LIMIT: usize = 100;

/// Document state captured before an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Snapshot {
    pub blocks: Vec<Node>,
    pub cursor: usize,
}

/// Kind of edit, used to coalesce runs of typing into one undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EditKind {
    Typing,
    Deleting,
    Structure,
}

/// Snapshot-based undo/redo stacks.
///
/// - Recording an edit clears the redo stack
/// - Consecutive typing (or deleting) in the same block is one step
/// - The oldest step is dropped past [`HISTORY_LIMIT`]
#[derive(Debug, Default)]
pub(super) struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    last_edit: Option<(EditKind, usize)>,
}

impl History {
    pub fn record(&mut self, before: Snapshot, kind: EditKind, block: usize) {
        let coalesce = kind != EditKind::Structure && self.last_edit == Some((kind, block));
        self.last_edit = Some((kind, block));
        self.redo.clear();
        if coalesce {
            return;
        }
        self.undo.push(before);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
    }

    /// Pop the previous state, stashing `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        self.last_edit = None;
        Some(previous)
    }

    /// Pop the next state, stashing `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        self.last_edit = None;
        Some(next)
    }

    /// Break the current typing run so the next edit starts a new step.
    pub const fn seal(&mut self) {
        self.last_edit = None;
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.last_edit = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(cursor: usize) -> Snapshot {
        Snapshot {
            blocks: Vec::new(),
            cursor,
        }
    }

    #[test]
    fn test_typing_in_same_block_coalesces() {
        let mut history = History::default();
        history.record(snap(0), EditKind::Typing, 0);
        history.record(snap(1), EditKind::Typing, 0);
        assert_eq!(history.undo(snap(9)), Some(snap(0)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_structure_edits_never_coalesce() {
        let mut history = History::default();
        history.record(snap(0), EditKind::Structure, 0);
        history.record(snap(1), EditKind::Structure, 0);
        assert_eq!(history.undo(snap(9)), Some(snap(1)));
        assert!(history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::default();
        history.record(snap(0), EditKind::Structure, 0);
        history.undo(snap(1));
        assert!(history.can_redo());
        history.record(snap(2), EditKind::Typing, 0);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::default();
        for i in 0..HISTORY_LIMIT + 10 {
            history.record(snap(i), EditKind::Structure, i);
        }
        let mut steps = 0;
        while history.undo(snap(0)).is_some() {
            steps += 1;
        }
        assert_eq!(steps, HISTORY_LIMIT);
    }
}
