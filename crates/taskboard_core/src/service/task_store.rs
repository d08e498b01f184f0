//! Task store: the authoritative in-memory task collection.
//!
//! # Responsibility
//! - Own the ordered task collection and expose add/delete/toggle/edit.
//! - Persist the full collection after every mutation.
//! - Answer visible-page queries for the presentation layer.
//!
//! # Invariants
//! - Insertion order is preserved; only `delete` removes elements.
//! - Every mutating call performs exactly one full `save`, even when the
//!   target id is absent.
//! - A failed `save` keeps the in-memory mutation. The caller sees
//!   `PersistenceError(WriteFailed)` and memory is ahead of storage until
//!   the next successful write.
//! - Ids come from `Clock::now_millis` and are not checked for uniqueness.
//!   `toggle_complete` and `edit` touch every task sharing the id; `delete`
//!   removes only the first.

use crate::model::task::{NewTask, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{PersistenceError, TaskRepository};
use crate::service::clock::{Clock, SystemClock};
use crate::storage::KeyValueStorage;
use crate::view::{query_visible, PageRequest, TaskFilter, VisiblePage};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Validation(TaskValidationError),
    Persistence(PersistenceError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Owned task store backed by key-value storage.
pub struct TaskStore<S: KeyValueStorage, C: Clock = SystemClock> {
    repo: TaskRepository<S>,
    clock: C,
    tasks: Vec<Task>,
}

impl<S: KeyValueStorage, C: Clock> TaskStore<S, C> {
    /// Loads the persisted collection.
    ///
    /// # Errors
    /// - `Persistence(Malformed)` when stored data does not decode; the
    ///   caller decides whether to halt or start empty.
    pub fn initialize(storage: S, clock: C) -> StoreResult<Self> {
        let repo = TaskRepository::new(storage);
        let tasks = repo.load()?;
        info!(
            "event=store_init module=store status=ok count={}",
            tasks.len()
        );
        Ok(Self { repo, clock, tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a pending task with a clock-derived id.
    ///
    /// The new task is the last element of the returned collection.
    pub fn add(&mut self, new_task: NewTask) -> StoreResult<&[Task]> {
        new_task.validate()?;

        let id = self.clock.now_millis();
        if self.get(id).is_some() {
            warn!("event=task_add module=store status=id_collision id={id}");
        }
        self.tasks.push(Task::from_new(id, new_task));

        self.persist("task_add", id)
    }

    /// Removes the first task with `id`; absent ids leave the collection
    /// unchanged but still persist it.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<&[Task]> {
        if let Some(index) = self.position(id) {
            self.tasks.remove(index);
        }
        self.persist("task_delete", id)
    }

    /// Flips `completed` on every task with `id`.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreResult<&[Task]> {
        for task in self.tasks.iter_mut().filter(|task| task.id == id) {
            task.toggle_completed();
        }
        self.persist("task_toggle", id)
    }

    /// Replaces every task whose id matches `updated.id`, keeping positions.
    pub fn edit(&mut self, updated: Task) -> StoreResult<&[Task]> {
        updated.validate()?;

        let id = updated.id;
        for task in self.tasks.iter_mut().filter(|task| task.id == id) {
            *task = updated.clone();
        }
        self.persist("task_edit", id)
    }

    /// Filters then paginates the current collection.
    pub fn query_visible(&self, filter: &TaskFilter, page: PageRequest) -> VisiblePage {
        query_visible(&self.tasks, filter, page)
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn persist(&mut self, event: &'static str, id: TaskId) -> StoreResult<&[Task]> {
        if let Err(err) = self.repo.save(&self.tasks) {
            error!(
                "event={} module=store status=error id={} count={} error={}",
                event,
                id,
                self.tasks.len(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event={} module=store status=ok id={} count={}",
            event,
            id,
            self.tasks.len()
        );
        Ok(&self.tasks)
    }
}
