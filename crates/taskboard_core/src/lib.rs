//! Core domain logic for the task board.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::task::{
    Category, DateTimeRange, NewTask, ParseLabelError, Priority, Task, TaskDraft, TaskField,
    TaskId, TaskValidationError,
};
pub use repo::task_repo::{
    PersistenceError, PersistenceErrorKind, PersistenceResult, TaskRepository, TASKS_STORAGE_KEY,
};
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::task_store::{StoreError, StoreResult, TaskStore};
pub use storage::{
    KeyValueStorage, MemoryKeyValueStorage, SqliteKeyValueStorage, StorageError, StorageResult,
};
pub use view::{
    page_count, query_visible, PageRequest, StatusFilter, TaskFilter, VisiblePage,
    DEFAULT_PAGE_SIZE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
