use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use todo_core::{
    IdGenerationError, KeyValueStore, MemoryKeyValueStore, Notification, NotificationEvent,
    NotificationLevel, Notifier, StorageResult, StoreConfig, StoreError, Task, TaskRepository,
    TaskStore,
};

/// Memory store that records every write.
#[derive(Clone, Default)]
struct RecordingStore {
    inner: MemoryKeyValueStore,
    writes: Arc<Mutex<Vec<String>>>,
}

impl RecordingStore {
    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn last_written(&self) -> Vec<Task> {
        let writes = self.writes.lock().unwrap();
        serde_json::from_str(writes.last().expect("at least one write")).unwrap()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.writes.lock().unwrap().push(value.to_string());
        self.inner.set(key, value)
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<(NotificationLevel, NotificationEvent)> {
        self.seen
            .borrow()
            .iter()
            .map(|notification| (notification.level, notification.event))
            .collect()
    }

    fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

fn ready_store() -> (
    TaskStore<RecordingStore, RecordingNotifier>,
    RecordingStore,
    RecordingNotifier,
) {
    let kv = RecordingStore::default();
    let notifier = RecordingNotifier::default();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), notifier.clone());
    assert!(store.activate());
    (store, kv, notifier)
}

fn seeded_store(tasks: &[Task]) -> (TaskStore<RecordingStore, RecordingNotifier>, RecordingStore) {
    let kv = RecordingStore::default();
    kv.inner
        .set("todos", &serde_json::to_string(tasks).unwrap())
        .unwrap();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), RecordingNotifier::default());
    assert!(store.activate());
    (store, kv)
}

#[test]
fn end_to_end_add_toggle_update_delete() {
    let (mut store, kv, notifier) = ready_store();
    assert_eq!(kv.write_count(), 0);

    assert!(store.add("Buy milk").unwrap());
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "Buy milk");
    assert!(!tasks[0].completed);
    let id = tasks[0].id.clone();
    assert_eq!(kv.write_count(), 1);

    store.toggle(&id);
    assert!(store.tasks()[0].completed);
    assert_eq!(kv.write_count(), 2);

    assert!(store.update(&id, "Buy milk and eggs"));
    assert_eq!(store.tasks()[0].text, "Buy milk and eggs");
    assert!(store.tasks()[0].completed);
    assert_eq!(kv.write_count(), 3);
    assert_eq!(kv.last_written(), *store.tasks());

    store.delete(&id);
    assert!(store.tasks().is_empty());
    assert_eq!(kv.write_count(), 4);
    assert!(kv.last_written().is_empty());

    assert_eq!(
        notifier.events(),
        vec![
            (NotificationLevel::Success, NotificationEvent::TaskAdded),
            (NotificationLevel::Success, NotificationEvent::TaskCompleted),
            (NotificationLevel::Success, NotificationEvent::TaskUpdated),
            (NotificationLevel::Success, NotificationEvent::TaskDeleted),
        ]
    );
}

#[test]
fn add_trims_text_and_prepends() {
    let existing = [
        Task::with_created_at("b", "second", "2024-01-01T10:00:00.000Z"),
        Task::with_created_at("a", "first", "2024-01-01T09:00:00.000Z"),
    ];
    let (mut store, _kv) = seeded_store(&existing);

    assert!(store.add("  X  ").unwrap());
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].text, "X");
    assert_eq!(tasks[1].id, "b");
    assert_eq!(tasks[2].id, "a");
    assert!(tasks[0].created_at_utc().is_some());
}

#[test]
fn invalid_text_is_rejected_without_change_or_save() {
    let (mut store, kv, notifier) = ready_store();

    assert!(!store.add("   ").unwrap());
    assert!(!store.add(&"x".repeat(501)).unwrap());
    assert!(store.tasks().is_empty());

    store.add("valid").unwrap();
    let id = store.tasks()[0].id.clone();
    notifier.clear();
    let writes_before = kv.write_count();

    assert!(!store.update(&id, ""));
    assert_eq!(store.tasks()[0].text, "valid");
    assert_eq!(kv.write_count(), writes_before);
    assert_eq!(
        notifier.events(),
        vec![(NotificationLevel::Error, NotificationEvent::InvalidText)]
    );
}

#[test]
fn toggle_twice_restores_state_with_opposite_messages() {
    let (mut store, _kv, notifier) = ready_store();
    store.add("Walk the dog").unwrap();
    let id = store.tasks()[0].id.clone();
    notifier.clear();

    store.toggle(&id);
    store.toggle(&id);

    assert!(!store.tasks()[0].completed);
    assert_eq!(
        notifier.events(),
        vec![
            (NotificationLevel::Success, NotificationEvent::TaskCompleted),
            (NotificationLevel::Success, NotificationEvent::TaskReopened),
        ]
    );
}

#[test]
fn toggle_changes_only_matching_task() {
    let existing = [
        Task::with_created_at("a", "one", "2024-01-01T10:00:00.000Z"),
        Task::with_created_at("b", "two", "2024-01-01T09:00:00.000Z"),
    ];
    let (mut store, _kv) = seeded_store(&existing);

    store.toggle("b");
    let tasks = store.tasks();
    assert!(!tasks[0].completed);
    assert!(tasks[1].completed);
    assert_eq!(tasks[1].text, "two");
    assert_eq!(tasks[1].created_at, "2024-01-01T09:00:00.000Z");
}

#[test]
fn unknown_ids_are_benign() {
    let existing = [Task::with_created_at(
        "a",
        "one",
        "2024-01-01T10:00:00.000Z",
    )];
    let kv = RecordingStore::default();
    kv.inner
        .set("todos", &serde_json::to_string(&existing).unwrap())
        .unwrap();
    let notifier = RecordingNotifier::default();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), notifier.clone());
    store.activate();

    store.delete("missing-id");
    store.toggle("missing-id");
    assert!(notifier.events().is_empty());

    assert!(store.update("missing-id", "valid text"));
    assert_eq!(*store.tasks(), existing.to_vec());
    assert_eq!(
        notifier.events(),
        vec![(NotificationLevel::Success, NotificationEvent::TaskUpdated)]
    );
}

#[test]
fn snapshots_are_not_mutated_by_later_operations() {
    let (mut store, _kv, _notifier) = ready_store();
    store.add("first").unwrap();
    let before = store.tasks();
    let id = before[0].id.clone();

    store.toggle(&id);
    store.update(&id, "changed");
    store.add("second").unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(before[0].text, "first");
    assert!(!before[0].completed);
}

#[test]
fn id_generation_failure_propagates_and_leaves_state_unchanged() {
    let kv = RecordingStore::default();
    let notifier = RecordingNotifier::default();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), notifier.clone())
        .with_id_generator(|| -> Result<String, IdGenerationError> {
            Err(IdGenerationError::new("entropy source offline"))
        });
    store.activate();

    let err = store.add("Buy milk").unwrap_err();
    assert!(matches!(err, StoreError::IdGeneration(_)));
    assert!(store.tasks().is_empty());
    assert_eq!(kv.write_count(), 0);
    assert!(notifier.events().is_empty());
}

#[test]
fn no_save_before_ready() {
    let kv = RecordingStore::default();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), RecordingNotifier::default());

    store.add("before load").unwrap();
    assert_eq!(kv.write_count(), 0);

    store.activate();
    assert_eq!(kv.write_count(), 0);
    assert!(store.tasks().is_empty());

    store.add("after load").unwrap();
    assert_eq!(kv.write_count(), 1);
}

#[test]
fn load_can_run_on_worker_thread() {
    let kv = RecordingStore::default();
    kv.inner
        .set(
            "todos",
            r#"[{"id":"a","text":"stored","completed":true,"createdAt":"2024-01-01T10:00:00.000Z"}]"#,
        )
        .unwrap();
    let mut store = TaskStore::new(TaskRepository::new(kv.clone()), RecordingNotifier::default());

    let pending = store.begin_load().unwrap();
    let completed = std::thread::spawn(move || pending.run()).join().unwrap();
    assert_eq!(completed.tasks().len(), 1);

    assert!(store.apply_load(completed));
    assert_eq!(store.tasks()[0].text, "stored");
    assert_eq!(store.stats().display_percentage(), Some(100));
}

#[test]
fn late_load_for_dropped_store_is_discarded_by_replacement() {
    let kv = RecordingStore::default();
    let mut unmounted = TaskStore::new(TaskRepository::new(kv.clone()), RecordingNotifier::default());
    let stale = unmounted.begin_load().unwrap().run();
    drop(unmounted);

    let mut remounted = TaskStore::new(TaskRepository::new(kv.clone()), RecordingNotifier::default());
    let fresh = remounted.begin_load().unwrap();
    assert!(!remounted.apply_load(stale));
    assert!(remounted.apply_load(fresh.run()));
}

#[test]
fn config_storage_key_is_used() {
    let kv = MemoryKeyValueStore::new();
    let config = StoreConfig::default().with_storage_key("work");
    let mut store = TaskStore::from_config(kv.clone(), |_: Notification| {}, &config);
    store.activate();
    store.add("file report").unwrap();

    assert!(kv.get("work").unwrap().is_some());
    assert!(kv.get("todos").unwrap().is_none());
    assert_eq!(store.repository().key(), "work");
}

#[test]
fn sorted_view_puts_incomplete_first() {
    let mut done = Task::with_created_at("c", "done", "2024-01-01T12:00:00.000Z");
    done.completed = true;
    let existing = [
        Task::with_created_at("a", "older", "2024-01-01T10:00:00.000Z"),
        done,
        Task::with_created_at("b", "newer", "2024-01-01T14:00:00.000Z"),
    ];
    let (store, _kv) = seeded_store(&existing);

    let order: Vec<String> = store.sorted_tasks().into_iter().map(|task| task.id).collect();
    assert_eq!(order, vec!["b", "a", "c"]);
    assert_eq!(store.tasks()[0].id, "a");
}
