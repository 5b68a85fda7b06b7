//! Task domain model and identity helpers.
//!
//! # Responsibility
//! - Define the canonical `Task` record persisted and rendered by the app.
//! - Own the single text validation gate used by create and update paths.
//! - Generate opaque, collision-resistant task identifiers.
//!
//! # Invariants
//! - Every task is identified by an id that is never reused in the live
//!   collection.
//! - Task text is stored trimmed and never empty.

pub mod id;
pub mod task;
