//! Task store: owner of the in-memory task collection.
//!
//! # Responsibility
//! - Expose add/delete/toggle/update over the task collection.
//! - Run the one-time initial load and gate persistence on its completion.
//! - Report outcomes through the injected [`Notifier`].
//!
//! # Invariants
//! - Load state only moves `Uninitialized -> Loading -> Ready`.
//! - Nothing is saved before the load result has been applied, and applying
//!   the load result never saves.
//! - Every accepted operation publishes a new snapshot; snapshots handed out
//!   earlier never change.
//! - New tasks are prepended.

use crate::config::StoreConfig;
use crate::model::id::{IdGenerationError, RandomIdGenerator, TaskIdGenerator};
use crate::model::task::{validate_task_text, Task};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::task_repo::TaskRepository;
use crate::service::notifier::{Notification, NotificationEvent, Notifier};
use crate::service::views::{sort_for_display, TaskStats};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Immutable view of the collection at one point in time.
pub type TaskSnapshot = Arc<Vec<Task>>;

/// Initial load progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    /// Load result applied; state is authoritative and persisted on change.
    Ready,
}

/// Identifies which store a load was started by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    store_id: u64,
}

/// Load started by [`TaskStore::begin_load`] and not yet executed.
///
/// May be moved to another thread; the store itself keeps serving
/// operations while the load is outstanding.
#[derive(Debug)]
pub struct PendingLoad<S> {
    ticket: LoadTicket,
    repo: TaskRepository<S>,
}

impl<S: KeyValueStore> PendingLoad<S> {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Reads the stored collection.
    ///
    /// A panic raised by the backend is caught and treated as an empty load.
    pub fn run(self) -> CompletedLoad {
        let repo = &self.repo;
        let tasks = match panic::catch_unwind(AssertUnwindSafe(|| repo.load())) {
            Ok(tasks) => tasks,
            Err(_) => {
                error!(
                    "event=store_load module=service status=error error_code=load_panicked key={}",
                    repo.key()
                );
                Vec::new()
            }
        };
        CompletedLoad {
            ticket: self.ticket,
            tasks,
        }
    }
}

/// Result of [`PendingLoad::run`], ready to hand back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedLoad {
    ticket: LoadTicket,
    tasks: Vec<Task>,
}

impl CompletedLoad {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }
}

/// Store operation failure that is not handled locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    IdGeneration(IdGenerationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdGeneration(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IdGeneration(err) => Some(err),
        }
    }
}

impl From<IdGenerationError> for StoreError {
    fn from(value: IdGenerationError) -> Self {
        Self::IdGeneration(value)
    }
}

/// In-memory owner of the task collection.
pub struct TaskStore<S, N> {
    store_id: u64,
    repo: TaskRepository<S>,
    notifier: N,
    ids: Box<dyn TaskIdGenerator>,
    tasks: TaskSnapshot,
    state: LoadState,
}

impl<S, N> TaskStore<S, N>
where
    S: KeyValueStore + Clone,
    N: Notifier,
{
    /// Creates an uninitialized store over `repo`.
    pub fn new(repo: TaskRepository<S>, notifier: N) -> Self {
        Self {
            store_id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            repo,
            notifier,
            ids: Box::new(RandomIdGenerator),
            tasks: TaskSnapshot::default(),
            state: LoadState::Uninitialized,
        }
    }

    /// Creates an uninitialized store persisting under `config`'s key.
    pub fn from_config(store: S, notifier: N, config: &StoreConfig) -> Self {
        Self::new(
            TaskRepository::with_key(store, config.storage_key_or_default()),
            notifier,
        )
    }

    /// Replaces the id generator used by [`TaskStore::add`].
    pub fn with_id_generator(mut self, ids: impl TaskIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Current snapshot in storage order (newest first).
    pub fn tasks(&self) -> TaskSnapshot {
        Arc::clone(&self.tasks)
    }

    /// Current snapshot in display order.
    pub fn sorted_tasks(&self) -> Vec<Task> {
        sort_for_display(self.tasks.as_slice())
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(self.tasks.as_slice())
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    /// Starts the initial load.
    ///
    /// Returns `None` once a load has already been started; the store loads
    /// at most once in its lifetime.
    pub fn begin_load(&mut self) -> Option<PendingLoad<S>> {
        if self.state != LoadState::Uninitialized {
            debug!(
                "event=store_load module=service status=skip reason=already_started state={:?}",
                self.state
            );
            return None;
        }
        self.state = LoadState::Loading;
        Some(PendingLoad {
            ticket: LoadTicket {
                store_id: self.store_id,
            },
            repo: self.repo.clone(),
        })
    }

    /// Applies a finished load and marks the store ready.
    ///
    /// Returns `false` and discards the result when it was not started by
    /// this store or the store is no longer waiting for it.
    pub fn apply_load(&mut self, loaded: CompletedLoad) -> bool {
        if loaded.ticket.store_id != self.store_id || self.state != LoadState::Loading {
            warn!(
                "event=store_load module=service status=skip reason=stale_result state={:?}",
                self.state
            );
            return false;
        }
        info!(
            "event=store_load module=service status=ok count={}",
            loaded.tasks.len()
        );
        self.tasks = Arc::new(loaded.tasks);
        self.state = LoadState::Ready;
        true
    }

    /// Runs the initial load synchronously.
    ///
    /// Returns `false` when a load was already started.
    pub fn activate(&mut self) -> bool {
        match self.begin_load() {
            Some(pending) => self.apply_load(pending.run()),
            None => false,
        }
    }

    /// Prepends a new task built from `text`.
    ///
    /// Returns `Ok(false)` after an error notification when `text` is
    /// invalid.
    ///
    /// # Errors
    /// - `StoreError::IdGeneration` when the id generator fails; the
    ///   collection is left unchanged.
    pub fn add(&mut self, text: &str) -> Result<bool, StoreError> {
        let Some(text) = self.accept_text("add", text) else {
            return Ok(false);
        };

        let task = Task::new(self.ids.generate()?, text);
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());
        self.publish("add", next);

        self.notifier
            .notify(Notification::success(NotificationEvent::TaskAdded));
        Ok(true)
    }

    /// Removes the task with `id`, if present.
    pub fn delete(&mut self, id: &str) {
        let removed = self.tasks.iter().any(|task| task.id == id);
        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.publish("delete", next);

        if removed {
            self.notifier
                .notify(Notification::success(NotificationEvent::TaskDeleted));
        }
    }

    /// Flips `completed` on the task with `id`; silent when absent.
    pub fn toggle(&mut self, id: &str) {
        let now_completed = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| !task.completed);
        let next = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    Task {
                        completed: !task.completed,
                        ..task.clone()
                    }
                } else {
                    task.clone()
                }
            })
            .collect();
        self.publish("toggle", next);

        if let Some(completed) = now_completed {
            let event = if completed {
                NotificationEvent::TaskCompleted
            } else {
                NotificationEvent::TaskReopened
            };
            self.notifier.notify(Notification::success(event));
        }
    }

    /// Replaces the text of the task with `id`.
    ///
    /// Returns `false` after an error notification when `text` is invalid.
    /// Valid text always returns `true`, including for ids not in the
    /// collection: the edit is a map over the collection, not a lookup.
    pub fn update(&mut self, id: &str, text: &str) -> bool {
        let Some(text) = self.accept_text("update", text) else {
            return false;
        };

        let next = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    Task {
                        text: text.to_string(),
                        ..task.clone()
                    }
                } else {
                    task.clone()
                }
            })
            .collect();
        self.publish("update", next);

        self.notifier
            .notify(Notification::success(NotificationEvent::TaskUpdated));
        true
    }

    fn accept_text<'a>(&self, operation: &'static str, text: &'a str) -> Option<&'a str> {
        match validate_task_text(text) {
            Ok(trimmed) => Some(trimmed),
            Err(err) => {
                debug!(
                    "event=store_{operation} module=service status=rejected reason=\"{err}\""
                );
                self.notifier
                    .notify(Notification::error(NotificationEvent::InvalidText));
                None
            }
        }
    }

    fn publish(&mut self, operation: &'static str, next: Vec<Task>) {
        self.tasks = Arc::new(next);
        if self.state == LoadState::Ready {
            self.repo.save(self.tasks.as_slice());
        } else {
            debug!(
                "event=store_{operation} module=service status=ok persist=skip state={:?}",
                self.state
            );
        }
    }
}
