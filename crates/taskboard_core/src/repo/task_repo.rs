//! Task collection persistence adapter.
//!
//! # Responsibility
//! - Load and save the whole task collection as one JSON array under the
//!   `tasks` storage key.
//!
//! # Invariants
//! - `save` always writes the complete collection; there are no partial
//!   updates or schema migrations of the blob.
//! - `load` never mutates storage and never masks malformed data.

use crate::model::task::Task;
use crate::storage::{KeyValueStorage, StorageError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized task collection.
pub const TASKS_STORAGE_KEY: &str = "tasks";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Coarse persistence failure category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    Malformed,
    ReadFailed,
    WriteFailed,
}

impl PersistenceErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
        }
    }
}

#[derive(Debug)]
pub enum PersistenceError {
    /// Stored data exists but is not a valid task array.
    Malformed(serde_json::Error),
    ReadFailed(StorageError),
    WriteFailed(StorageError),
    /// The collection could not be encoded; reported as a write failure.
    Encode(serde_json::Error),
}

impl PersistenceError {
    pub fn kind(&self) -> PersistenceErrorKind {
        match self {
            Self::Malformed(_) => PersistenceErrorKind::Malformed,
            Self::ReadFailed(_) => PersistenceErrorKind::ReadFailed,
            Self::WriteFailed(_) | Self::Encode(_) => PersistenceErrorKind::WriteFailed,
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed persisted task data: {err}"),
            Self::ReadFailed(err) => write!(f, "failed to read persisted tasks: {err}"),
            Self::WriteFailed(err) => write!(f, "failed to persist tasks: {err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
            Self::ReadFailed(err) | Self::WriteFailed(err) => Some(err),
        }
    }
}

/// Repository serializing the task collection through key-value storage.
pub struct TaskRepository<S> {
    storage: S,
}

impl<S: KeyValueStorage> TaskRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Reads the persisted collection.
    ///
    /// An absent key and an empty stored string both yield an empty
    /// collection.
    ///
    /// # Errors
    /// - `Malformed` when stored text does not decode as a task array.
    /// - `ReadFailed` when the storage backend rejects the read.
    pub fn load(&self) -> PersistenceResult<Vec<Task>> {
        let raw = self
            .storage
            .get_item(TASKS_STORAGE_KEY)
            .map_err(PersistenceError::ReadFailed)
            .inspect_err(log_failure("tasks_load"))?;

        let Some(raw) = raw.filter(|value| !value.is_empty()) else {
            info!("event=tasks_load module=repo status=ok count=0 stored=false");
            return Ok(Vec::new());
        };

        let tasks: Vec<Task> = serde_json::from_str(&raw)
            .map_err(PersistenceError::Malformed)
            .inspect_err(log_failure("tasks_load"))?;

        info!(
            "event=tasks_load module=repo status=ok count={} bytes={}",
            tasks.len(),
            raw.len()
        );
        Ok(tasks)
    }

    /// Serializes `tasks` and overwrites the stored value.
    ///
    /// # Errors
    /// - `WriteFailed` when storage rejects the write (quota, disabled
    ///   backend). No retry is attempted.
    pub fn save(&mut self, tasks: &[Task]) -> PersistenceResult<()> {
        let encoded = serde_json::to_string(tasks)
            .map_err(PersistenceError::Encode)
            .inspect_err(log_failure("tasks_save"))?;

        self.storage
            .set_item(TASKS_STORAGE_KEY, &encoded)
            .map_err(PersistenceError::WriteFailed)
            .inspect_err(log_failure("tasks_save"))?;

        info!(
            "event=tasks_save module=repo status=ok count={} bytes={}",
            tasks.len(),
            encoded.len()
        );
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn log_failure(event: &'static str) -> impl Fn(&PersistenceError) {
    move |err: &PersistenceError| {
        error!(
            "event={} module=repo status=error kind={} error={}",
            event,
            err.kind().as_str(),
            err
        );
    }
}
