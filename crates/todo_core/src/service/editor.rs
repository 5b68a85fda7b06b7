//! Editing affordances that decide when store operations fire.
//!
//! # Invariants
//! - `TaskEditor` leaves `Editing` only on cancel or on an update that
//!   returns `true`; a rejected update keeps the draft for another attempt.
//! - `AddTaskDraft` never calls `add` for whitespace-only input.

use crate::model::task::{Task, TaskId};

/// Per-task editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Viewing,
    Editing { task_id: TaskId, draft: String },
}

/// Inline editor for one rendered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditor {
    can_update: bool,
    state: EditorState,
}

impl TaskEditor {
    /// Creates a viewing editor; `can_update` is whether an update
    /// capability is wired for this list.
    pub fn new(can_update: bool) -> Self {
        Self {
            can_update,
            state: EditorState::Viewing,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditorState::Editing { draft, .. } => Some(draft.as_str()),
            EditorState::Viewing => None,
        }
    }

    /// Enters editing with the task's current text as draft.
    ///
    /// Returns `false` when no update capability is wired.
    pub fn begin_edit(&mut self, task: &Task) -> bool {
        if !self.can_update {
            return false;
        }
        self.state = EditorState::Editing {
            task_id: task.id.clone(),
            draft: task.text.clone(),
        };
        true
    }

    /// Replaces the draft; ignored while viewing.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditorState::Editing { draft, .. } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Leaves editing and discards the draft.
    pub fn cancel(&mut self) {
        self.state = EditorState::Viewing;
    }

    /// Submits the draft through `update(task_id, draft)`.
    ///
    /// Returns whether the editor went back to viewing.
    pub fn commit(&mut self, update: impl FnOnce(&str, &str) -> bool) -> bool {
        let EditorState::Editing { task_id, draft } = &self.state else {
            return false;
        };
        if !self.can_update || !update(task_id.as_str(), draft.as_str()) {
            return false;
        }
        self.state = EditorState::Viewing;
        true
    }
}

/// Outcome of [`AddTaskDraft::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank; `add` was not called.
    Skipped,
    Added,
    Rejected,
}

/// Input buffer of the add-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTaskDraft {
    input: String,
}

impl AddTaskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        self.input.as_str()
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Submits the buffer through `add`, clearing it on success.
    ///
    /// # Errors
    /// Propagates the error returned by `add`; the buffer is kept.
    pub fn submit<E>(
        &mut self,
        add: impl FnOnce(&str) -> Result<bool, E>,
    ) -> Result<SubmitOutcome, E> {
        if self.input.trim().is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }
        if add(self.input.as_str())? {
            self.input.clear();
            Ok(SubmitOutcome::Added)
        } else {
            Ok(SubmitOutcome::Rejected)
        }
    }
}
