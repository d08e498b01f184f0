//! Domain model for the task board.
//!
//! # Responsibility
//! - Define the canonical task shape shared by store, repository and view.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` assigned at creation.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
