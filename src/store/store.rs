use indexmap::IndexMap;

use crate::model::{BoardConfig, Column, Project, Row, Sheet};

use super::derive::{self, CounterOffsets};
use super::history::History;
use super::notify::{ChangeReason, Listener, Notifier};
use super::patch::SlotPatch;

/// Refusals from operations that would break the "always at least one"
/// invariants. Callers surface these as user feedback, not as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardRefusal {
    #[error("the last sheet cannot be deleted")]
    LastSheet,
    #[error("the last column cannot be deleted")]
    LastColumn,
}

/// Owns the single mutable project tree. Every mutation routes through here;
/// the render side and the detail editor hold no independent write path.
pub struct Store {
    project: Project,
    config: BoardConfig,
    notifier: Notifier,
    history: History,
}

impl Store {
    pub fn new(config: BoardConfig) -> Store {
        let project = Project::new(&config);
        Store::with_project(project, config)
    }

    pub fn with_project(project: Project, config: BoardConfig) -> Store {
        Store {
            project,
            config,
            notifier: Notifier::default(),
            history: History::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // --- Subscription & delivery -------------------------------------------

    pub fn subscribe(&mut self, listener: Listener) {
        self.notifier.subscribe(listener);
    }

    pub fn begin_batch(&mut self) {
        self.notifier.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.notifier.end_batch(&self.project);
    }

    /// Deliver coalesced keystroke-rate notifications. The event loop calls
    /// this once per frame. Returns true when a delivery happened.
    pub fn flush(&mut self) -> bool {
        self.notifier.flush(&self.project)
    }

    fn notify(&mut self, reason: ChangeReason) {
        self.notifier.notify(&self.project, reason);
    }

    // --- Sheet operations --------------------------------------------------

    /// No-op when the id is unknown.
    pub fn set_active_sheet(&mut self, id: &str) {
        if !self.project.sheets.iter().any(|s| s.id == id) {
            return;
        }
        self.project.active_sheet_id = id.to_string();
        self.notify(ChangeReason::Sheet);
    }

    pub fn add_sheet(&mut self, name: Option<&str>) {
        self.history.push(&self.project);
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("Process {}", self.project.sheets.len() + 1),
        };
        let sheet = Sheet::new(name, &self.config);
        self.project.active_sheet_id = sheet.id.clone();
        self.project.sheets.push(sheet);
        self.notify(ChangeReason::Sheet);
    }

    pub fn rename_sheet(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.project.active_sheet().name == name {
            return;
        }
        self.history.push(&self.project);
        self.project.active_sheet_mut().name = name.to_string();
        self.notify(ChangeReason::Sheet);
    }

    /// Deletes the active sheet and selects its predecessor (or the new
    /// first sheet). Refuses on the last sheet.
    pub fn delete_sheet(&mut self) -> Result<(), GuardRefusal> {
        if self.project.sheets.len() <= 1 {
            return Err(GuardRefusal::LastSheet);
        }
        let idx = self.project.active_sheet_index();
        self.history.push(&self.project);
        self.project.sheets.remove(idx);
        let new_idx = idx.saturating_sub(1);
        self.project.active_sheet_id = self.project.sheets[new_idx].id.clone();
        self.notify(ChangeReason::Sheet);
        Ok(())
    }

    // --- Column operations -------------------------------------------------

    /// Insert a fresh column after the given index; None appends at the end.
    pub fn add_column(&mut self, after: Option<usize>) {
        self.history.push(&self.project);
        let column = Column::new(&self.config);
        let columns = &mut self.project.active_sheet_mut().columns;
        match after {
            Some(idx) if idx < columns.len() => columns.insert(idx + 1, column),
            _ => columns.push(column),
        }
        self.notify(ChangeReason::Structure);
    }

    /// Refuses on the last column of the sheet.
    pub fn delete_column(&mut self, index: usize) -> Result<(), GuardRefusal> {
        let sheet = self.project.active_sheet();
        if sheet.columns.len() <= 1 {
            return Err(GuardRefusal::LastColumn);
        }
        if index >= sheet.columns.len() {
            return Ok(());
        }
        self.history.push(&self.project);
        self.project.active_sheet_mut().columns.remove(index);
        self.notify(ChangeReason::Structure);
        Ok(())
    }

    /// Swap a column with its neighbor. The column object carries its
    /// transition/parallel flags with it. No-op when out of bounds.
    pub fn move_column(&mut self, index: usize, direction: isize) {
        let len = self.project.active_sheet().columns.len();
        let Some(target) = index.checked_add_signed(direction) else {
            return;
        };
        if index >= len || target >= len {
            return;
        }
        self.history.push(&self.project);
        self.project.active_sheet_mut().columns.swap(index, target);
        self.notify(ChangeReason::Structure);
    }

    pub fn set_col_visibility(&mut self, index: usize, visible: bool) {
        if self.project.active_sheet().columns.get(index).is_none() {
            return;
        }
        self.history.push(&self.project);
        self.project.active_sheet_mut().columns[index].is_visible = visible;
        self.notify(ChangeReason::Visibility);
    }

    pub fn toggle_parallel(&mut self, index: usize) {
        if self.project.active_sheet().columns.get(index).is_none() {
            return;
        }
        self.history.push(&self.project);
        let column = &mut self.project.active_sheet_mut().columns[index];
        column.is_parallel = !column.is_parallel;
        self.notify(ChangeReason::Structure);
    }

    /// None clears the transition; Some sets the flag and label.
    pub fn set_transition(&mut self, index: usize, value: Option<&str>) {
        let Some(column) = self.project.active_sheet_mut().columns.get_mut(index) else {
            return;
        };
        match value {
            None => {
                column.has_transition = false;
                column.transition_next.clear();
            }
            Some(label) => {
                column.has_transition = true;
                column.transition_next = label.to_string();
            }
        }
        self.notify(ChangeReason::Structure);
    }

    // --- Content operations ------------------------------------------------

    /// Throttled; intentionally skips history so undo stays at the
    /// granularity of a deliberate edit, not a keystroke.
    pub fn update_project_title(&mut self, title: &str) {
        self.project.title = title.to_string();
        self.notify(ChangeReason::Title);
    }

    /// Silent no-op when the coordinates don't resolve, or when the slot is
    /// link-driven (its displayed text belongs to the link source).
    pub fn update_sticky_text(&mut self, col: usize, row: Row, text: &str) {
        if row == Row::Input {
            let outputs = derive::all_outputs(&self.project);
            let sheet = self.project.active_sheet();
            if let Some(column) = sheet.columns.get(col)
                && let Some(link) = &column.slot(Row::Input).linked_source_id
                && outputs.contains_key(link)
            {
                return;
            }
        }
        let sheet = self.project.active_sheet_mut();
        let Some(column) = sheet.columns.get_mut(col) else {
            return;
        };
        column.slot_mut(row).text = text.to_string();
        self.notify(ChangeReason::Text { col, row });
    }

    /// Commit a detail-editor patch. One history snapshot per commit.
    pub fn save_slot_details(&mut self, col: usize, row: Row, patch: SlotPatch) {
        if self.project.active_sheet().columns.get(col).is_none() {
            return;
        }
        self.history.push(&self.project);
        let config = self.config.clone();
        let column = &mut self.project.active_sheet_mut().columns[col];
        patch.apply(column.slot_mut(row), &config);
        self.notify(ChangeReason::Details { col, row });
    }

    // --- Undo / redo -------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.project) {
            Some(project) => {
                self.project = project;
                self.notify(ChangeReason::Loaded);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.project) {
            Some(project) => {
                self.project = project;
                self.notify(ChangeReason::Loaded);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the project wholesale (import, storage load). Not recorded in
    /// history; delivers a full-rebuild notification.
    pub fn replace_project(&mut self, project: Project) {
        self.project = project;
        self.notify(ChangeReason::Loaded);
    }

    // --- Derived-data queries ----------------------------------------------

    pub fn global_counters_before_active(&self) -> CounterOffsets {
        derive::counters_before_active(&self.project)
    }

    pub fn all_outputs(&self) -> IndexMap<String, String> {
        derive::all_outputs(&self.project)
    }
}
