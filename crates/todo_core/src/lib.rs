//! Core logic for the task list app.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{
    default_log_level, init_logging, init_logging_with_config, logging_status, LoggingError,
};
pub use model::id::{generate_task_id, IdGenerationError, RandomIdGenerator, TaskIdGenerator};
pub use model::task::{
    is_valid_text, is_valid_text_value, validate_task_text, Task, TaskId, TaskValidationError,
    MAX_TASK_TEXT_CHARS,
};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::task_repo::TaskRepository;
pub use service::editor::{AddTaskDraft, EditorState, SubmitOutcome, TaskEditor};
pub use service::notifier::{
    LogNotifier, Notification, NotificationEvent, NotificationLevel, Notifier,
};
pub use service::task_store::{
    CompletedLoad, LoadState, LoadTicket, PendingLoad, StoreError, TaskSnapshot, TaskStore,
};
pub use service::views::{format_created_at, sort_for_display, TaskStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
