//! Presentation-facing derived views.
//!
//! Pure functions over a task slice; none of them mutate their input.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

const CREATED_AT_DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Returns a display-ordered copy of `tasks`.
///
/// Incomplete tasks come first; within each group newer `created_at` comes
/// first, and tasks whose timestamp fails to parse go last. The sort is
/// stable.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_cached_key(display_key);
    sorted
}

fn display_key(task: &Task) -> (bool, bool, Reverse<Option<DateTime<Utc>>>) {
    let created_at = task.created_at_utc();
    (task.completed, created_at.is_none(), Reverse(created_at))
}

/// Completion counts for the stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }

    /// Rounded completion percentage; `0` for an empty list.
    pub fn completion_percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.completed as f64 / self.total as f64;
        (ratio * 100.0).round() as u8
    }

    /// Percentage to render, or `None` when there is nothing to report.
    pub fn display_percentage(&self) -> Option<u8> {
        (self.total > 0).then(|| self.completion_percentage())
    }
}

/// Formats the task creation time as `dd/mm/yyyy HH:MM` (UTC).
///
/// Returns `None` when `created_at` is not a valid timestamp.
pub fn format_created_at(task: &Task) -> Option<String> {
    task.created_at_utc()
        .map(|created_at| created_at.format(CREATED_AT_DISPLAY_FORMAT).to_string())
}
