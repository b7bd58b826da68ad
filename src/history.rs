use crate::action::DrawAction;

/// Linear, branch-discarding history of drawing actions.
///
/// Actions past the cursor are kept only so they can be redone; recording a
/// new action drops them.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    actions: Vec<DrawAction>,
    /// Number of active actions, i.e. `step + 1`
    active: usize,
}

impl ActionHistory {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action after the cursor, discarding any redo branch
    pub fn record(&mut self, action: DrawAction) {
        self.actions.truncate(self.active);
        self.actions.push(action);
        self.active = self.actions.len();
    }

    /// Move the cursor back one action. Returns false when nothing is active.
    pub fn undo(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }

    /// Move the cursor forward one action. Returns false at the end of the sequence.
    pub fn redo(&mut self) -> bool {
        if self.active >= self.actions.len() {
            return false;
        }
        self.active += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.active > 0
    }

    pub fn can_redo(&self) -> bool {
        self.active < self.actions.len()
    }

    /// Index of the last active action, `-1` when none is active
    pub fn step(&self) -> isize {
        self.active as isize - 1
    }

    /// All recorded actions, including undone ones still available for redo
    pub fn actions(&self) -> &[DrawAction] {
        &self.actions
    }

    /// The actions that make up the current surface, in order
    pub fn active_actions(&self) -> &[DrawAction] {
        &self.actions[..self.active]
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.actions.clear();
        self.active = 0;
    }
}
