//! Repository layer over key-value storage.
//!
//! # Responsibility
//! - Own the serialized shape of persisted data.
//! - Isolate storage backends from the task store.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`Malformed`, `WriteFailed`) in
//!   addition to storage transport errors.

pub mod task_repo;
