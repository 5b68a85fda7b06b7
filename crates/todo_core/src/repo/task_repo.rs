//! Task collection persistence adapter.
//!
//! # Responsibility
//! - Load the full task collection from one fixed key.
//! - Save the full task collection back under that key.
//!
//! # Invariants
//! - `load` and `save` never fail; every failure is logged and degraded.
//! - Stored shape is a bare JSON array of tasks. A missing key, empty value,
//!   invalid JSON or non-array loads as an empty collection and is never
//!   upgraded in place. Array elements that do not read as a task are
//!   skipped; the rest of the array is kept.
//! - Task text never appears in log lines.

use crate::config::DEFAULT_STORAGE_KEY;
use crate::model::task::Task;
use crate::repo::kv_store::KeyValueStore;
use log::{debug, error, warn};
use serde_json::Value;

/// Persistence adapter mirroring the task collection into a key-value store.
///
/// `store = None` models an execution context without local storage (for
/// example a headless pre-render); loads return empty and saves are skipped.
#[derive(Debug, Clone)]
pub struct TaskRepository<S> {
    store: Option<S>,
    key: String,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Creates an adapter over `store` using the default storage key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Creates an adapter over `store` using a custom storage key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            key: key.into(),
        }
    }

    /// Creates an adapter with no backing store.
    pub fn unavailable() -> Self {
        Self {
            store: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Whether a backing store is present.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Storage key the collection is mirrored under.
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Loads the stored collection, degrading to empty on any failure.
    pub fn load(&self) -> Vec<Task> {
        let Some(store) = self.store.as_ref() else {
            debug!("event=tasks_load module=repo status=skip reason=store_unavailable");
            return Vec::new();
        };

        let raw = match store.get(self.key.as_str()) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(
                    "event=tasks_load module=repo status=ok key={} count=0 reason=absent",
                    self.key
                );
                return Vec::new();
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=repo status=error key={} error_code=read_failed error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        match decode_tasks(raw.as_str()) {
            Ok((tasks, dropped)) => {
                if dropped > 0 {
                    warn!(
                        "event=tasks_load module=repo status=partial key={} error_code=invalid_task_shape dropped={}",
                        self.key, dropped
                    );
                }
                debug!(
                    "event=tasks_load module=repo status=ok key={} count={}",
                    self.key,
                    tasks.len()
                );
                tasks
            }
            Err(reason) => {
                warn!(
                    "event=tasks_load module=repo status=error key={} error_code={} bytes={}",
                    self.key,
                    reason,
                    raw.len()
                );
                Vec::new()
            }
        }
    }

    /// Replaces the stored collection with `tasks`.
    ///
    /// Failures (serialization, quota, backend) are logged and swallowed; the
    /// caller's in-memory state stays authoritative.
    pub fn save(&self, tasks: &[Task]) {
        let Some(store) = self.store.as_ref() else {
            debug!("event=tasks_save module=repo status=skip reason=store_unavailable");
            return;
        };

        let encoded = match serde_json::to_string(tasks) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=tasks_save module=repo status=error key={} error_code=serialize_failed error={}",
                    self.key, err
                );
                return;
            }
        };

        match store.set(self.key.as_str(), encoded.as_str()) {
            Ok(()) => debug!(
                "event=tasks_save module=repo status=ok key={} count={} bytes={}",
                self.key,
                tasks.len(),
                encoded.len()
            ),
            Err(err) => error!(
                "event=tasks_save module=repo status=error key={} error_code=write_failed error={}",
                self.key, err
            ),
        }
    }
}

/// Decodes a stored array, keeping every element that reads as a `Task`.
///
/// Returns the kept tasks and the number of dropped elements.
fn decode_tasks(raw: &str) -> Result<(Vec<Task>, usize), &'static str> {
    let value: Value = serde_json::from_str(raw).map_err(|_| "invalid_json")?;
    let Value::Array(elements) = value else {
        return Err("not_an_array");
    };
    let stored = elements.len();
    let tasks: Vec<Task> = elements
        .into_iter()
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect();
    let dropped = stored - tasks.len();
    Ok((tasks, dropped))
}
