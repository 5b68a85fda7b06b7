//! Task domain model.
//!
//! # Responsibility
//! - Define the record mirrored to local storage and shown in the list.
//! - Validate user-supplied text before it reaches the collection.
//!
//! # Invariants
//! - `id` and `created_at` are assigned once at creation and never change.
//! - `text` is trimmed and holds 1..=500 characters.
//! - Wire field names are exactly `id`, `text`, `completed`, `createdAt`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum task text length, counted in characters after trimming.
pub const MAX_TASK_TEXT_CHARS: usize = 500;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Opaque task identifier.
///
/// Kept as a type alias so signatures state intent without constraining the
/// generated format (UUID or timestamp fallback).
pub type TaskId = String;

/// Single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier assigned at creation.
    pub id: TaskId,
    /// Trimmed user text.
    pub text: String,
    /// Completion flag flipped by toggle.
    pub completed: bool,
    /// ISO-8601 creation timestamp, serialized as `createdAt`.
    pub created_at: String,
}

impl Task {
    /// Creates an incomplete task stamped with the current UTC time.
    ///
    /// Callers are expected to pass text already accepted by
    /// [`validate_task_text`].
    pub fn new(id: impl Into<TaskId>, text: impl Into<String>) -> Self {
        Self::with_created_at(id, text, now_timestamp())
    }

    /// Creates an incomplete task with a caller-provided creation timestamp.
    ///
    /// Used by fixtures and import paths where the timestamp already exists.
    pub fn with_created_at(
        id: impl Into<TaskId>,
        text: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at: created_at.into(),
        }
    }

    /// Parses `created_at` as an RFC 3339 timestamp.
    ///
    /// Returns `None` for values written by other tools in a shape we do not
    /// understand; such tasks are still kept and rendered.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.created_at.as_str())
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }
}

/// Returns the current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Text validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty or whitespace-only.
    Empty,
    /// Trimmed text exceeds [`MAX_TASK_TEXT_CHARS`].
    TooLong { chars: usize },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "task text must not be empty"),
            Self::TooLong { chars } => write!(
                f,
                "task text has {chars} characters; maximum is {MAX_TASK_TEXT_CHARS}"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Validates candidate text and returns its trimmed form.
///
/// # Errors
/// - `Empty` when trimmed text has no characters.
/// - `TooLong` when trimmed text has more than 500 characters.
pub fn validate_task_text(candidate: &str) -> Result<&str, TaskValidationError> {
    let trimmed = candidate.trim_matches(is_trimmed_char);
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(TaskValidationError::Empty);
    }
    if chars > MAX_TASK_TEXT_CHARS {
        return Err(TaskValidationError::TooLong { chars });
    }
    Ok(trimmed)
}

// Unicode whitespace plus the byte order mark, which `str::trim` keeps.
fn is_trimmed_char(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

/// Returns whether `candidate` is acceptable task text.
pub fn is_valid_text(candidate: &str) -> bool {
    validate_task_text(candidate).is_ok()
}

/// Untyped variant of [`is_valid_text`] for values decoded from JSON.
///
/// Non-string values return `false`.
pub fn is_valid_text_value(candidate: &Value) -> bool {
    candidate.as_str().is_some_and(is_valid_text)
}

#[cfg(test)]
mod tests {
    use super::{
        is_valid_text, is_valid_text_value, validate_task_text, Task, TaskValidationError,
    };
    use serde_json::json;

    #[test]
    fn validate_returns_trimmed_text() {
        assert_eq!(validate_task_text("  Buy milk \n"), Ok("Buy milk"));
    }

    #[test]
    fn length_boundaries_are_inclusive() {
        assert!(is_valid_text("a"));
        assert!(is_valid_text(&"a".repeat(500)));
        assert!(is_valid_text(&format!("  {}  ", "a".repeat(500))));
        assert!(!is_valid_text(""));
        assert!(!is_valid_text("   \t\n"));
        assert_eq!(
            validate_task_text(&"a".repeat(501)),
            Err(TaskValidationError::TooLong { chars: 501 })
        );
    }

    #[test]
    fn byte_order_mark_is_trimmed() {
        assert!(!is_valid_text("\u{FEFF}"));
        assert!(!is_valid_text(" \u{FEFF}\t"));
        assert_eq!(validate_task_text("\u{FEFF}Buy milk\u{FEFF} "), Ok("Buy milk"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(is_valid_text(&"ệ".repeat(500)));
        assert!(!is_valid_text(&"ệ".repeat(501)));
    }

    #[test]
    fn non_string_values_are_rejected() {
        assert!(is_valid_text_value(&json!("task")));
        assert!(!is_valid_text_value(&json!(null)));
        assert!(!is_valid_text_value(&json!(123)));
        assert!(!is_valid_text_value(&json!({ "text": "x" })));
        assert!(!is_valid_text_value(&json!(["x"])));
        assert!(!is_valid_text_value(&json!(true)));
    }

    #[test]
    fn new_task_timestamp_is_iso_utc_with_millis() {
        let task = Task::new("id-1", "text");
        assert!(!task.completed);
        assert!(task.created_at.ends_with('Z'));
        assert_eq!(task.created_at.len(), "2024-01-01T10:00:00.000Z".len());
        assert!(task.created_at_utc().is_some());
    }

    #[test]
    fn unparseable_timestamp_yields_none() {
        let task = Task::with_created_at("id-1", "text", "yesterday");
        assert!(task.created_at_utc().is_none());
    }
}
