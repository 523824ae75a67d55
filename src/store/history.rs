use crate::model::Project;

/// Whole-project JSON snapshots, so the cap stays small.
const HISTORY_LIMIT: usize = 20;

/// Bounded undo/redo stacks of serialize-before-mutate snapshots.
/// Structural operations push; typing never does, which keeps undo at the
/// granularity of a deliberate edit rather than a keystroke.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<String>,
    redo: Vec<String>,
}

impl History {
    /// Snapshot the project as it is *before* the mutation about to happen.
    /// Consecutive identical snapshots dedup; a new push clears redo.
    pub fn push(&mut self, project: &Project) {
        let Ok(snapshot) = serde_json::to_string(project) else {
            return;
        };
        if self.undo.last() == Some(&snapshot) {
            return;
        }
        self.undo.push(snapshot);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Pop the latest snapshot, parking the current state on the redo stack.
    pub fn undo(&mut self, current: &Project) -> Option<Project> {
        let snapshot = self.undo.pop()?;
        let restored: Project = serde_json::from_str(&snapshot).ok()?;
        if let Ok(now) = serde_json::to_string(current) {
            self.redo.push(now);
        }
        Some(restored)
    }

    pub fn redo(&mut self, current: &Project) -> Option<Project> {
        let snapshot = self.redo.pop()?;
        let restored: Project = serde_json::from_str(&snapshot).ok()?;
        if let Ok(now) = serde_json::to_string(current) {
            self.undo.push(now);
        }
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
