//! Task identifier generation.
//!
//! # Responsibility
//! - Produce opaque, collision-resistant ids for new tasks.
//! - Expose a generator seam so the store can be driven by deterministic or
//!   failing generators.
//!
//! # Invariants
//! - The default generator never fails: it prefers a random v4 UUID and falls
//!   back to `todo-{unix_millis}-{suffix}` when OS randomness is unavailable.
//! - Two calls in immediate succession never return the same value in
//!   practice.

use crate::model::task::TaskId;
use log::warn;
use std::collections::hash_map::RandomState;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Builder;

const FALLBACK_PREFIX: &str = "todo";
const FALLBACK_SUFFIX_CHARS: usize = 9;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifier generation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerationError {
    message: String,
}

impl IdGenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for IdGenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "task id generation failed: {}", self.message)
    }
}

impl Error for IdGenerationError {}

/// Source of ids for newly created tasks.
pub trait TaskIdGenerator {
    fn generate(&self) -> Result<TaskId, IdGenerationError>;
}

/// Default generator backed by [`generate_task_id`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl TaskIdGenerator for RandomIdGenerator {
    fn generate(&self) -> Result<TaskId, IdGenerationError> {
        Ok(generate_task_id())
    }
}

impl<F> TaskIdGenerator for F
where
    F: Fn() -> Result<TaskId, IdGenerationError>,
{
    fn generate(&self) -> Result<TaskId, IdGenerationError> {
        self()
    }
}

/// Returns a new opaque task id.
pub fn generate_task_id() -> TaskId {
    let mut bytes = [0_u8; 16];
    match getrandom::fill(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string(),
        Err(err) => {
            warn!("event=id_generate module=model status=fallback reason=os_rng_unavailable error={err}");
            fallback_task_id()
        }
    }
}

fn fallback_task_id() -> TaskId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("{FALLBACK_PREFIX}-{millis}-{}", fallback_suffix())
}

// RandomState is seeded per process; the counter separates calls within the
// same millisecond.
fn fallback_suffix() -> String {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed));
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or_default();
    hasher.write_u32(nanos);

    let mut value = hasher.finish();
    let mut suffix = String::with_capacity(FALLBACK_SUFFIX_CHARS);
    for _ in 0..FALLBACK_SUFFIX_CHARS {
        suffix.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    suffix
}
