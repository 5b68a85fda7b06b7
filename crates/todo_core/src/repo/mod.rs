//! Persistence boundary for the task collection.
//!
//! # Responsibility
//! - Define the synchronous key-value contract the app persists through.
//! - Mirror the full task collection to/from one fixed key.
//!
//! # Invariants
//! - Storage failures never escape `TaskRepository`; they are logged and
//!   degrade to an empty load or a skipped save.
//! - Writes always replace the whole collection.

pub mod kv_store;
pub mod task_repo;
