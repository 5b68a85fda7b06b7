//! Task store and presentation-facing helpers.
//!
//! # Responsibility
//! - Own the task collection and its mutation operations (`task_store`).
//! - Derive display order and stats for list and stats views (`views`).
//! - Model the edit and add affordances that call into the store (`editor`).
//! - Carry user-facing outcomes to the host (`notifier`).

pub mod editor;
pub mod notifier;
pub mod task_store;
pub mod views;
