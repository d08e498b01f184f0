//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task board operations to Dart via FRB.
//! - Convert UI form values into validated core inputs.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens storage, loads a fresh `TaskStore`, and performs one
//!   operation; no task collection lives in global state.
//! - Store calls are serialized process-wide so concurrent callers never
//!   interleave a load with another caller's save.

use chrono::{DateTime, Utc};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use taskboard_core::db::open_db;
use taskboard_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    page_count,
    Category, DateTimeRange, NewTask, PageRequest, Priority, SqliteKeyValueStorage, StatusFilter,
    SystemClock, Task, TaskDraft, TaskField, TaskFilter, TaskStore, TaskValidationError,
    DEFAULT_PAGE_SIZE,
};

const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

type SqliteTaskStore<'conn> = TaskStore<SqliteKeyValueStorage<'conn>, SystemClock>;

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - An empty `level` selects the build default (`debug` or `info`).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(log_level_or_default(&level), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

fn log_level_or_default(level: &str) -> &str {
    let level = level.trim();
    if level.is_empty() {
        default_log_level().as_str()
    } else {
        level
    }
}

/// Selects the SQLite file backing task storage.
///
/// # FFI contract
/// - Must be called before the first task operation to take effect.
/// - Repeating the same path is accepted; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "storage already initialized at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// Form values for creating or editing a task.
///
/// Empty strings and `None` both count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `High|Medium|Low`.
    pub priority: Option<String>,
    /// One of the four category labels.
    pub category: Option<String>,
    pub start_epoch_ms: Option<i64>,
    pub end_epoch_ms: Option<i64>,
}

/// Task row rendered by the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub priority: String,
    pub category: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    pub completed: bool,
}

/// Full collection returned after every task operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Id targeted by the operation, when there is one.
    pub task_id: Option<i64>,
    pub items: Vec<TaskItem>,
    pub message: String,
}

impl TaskListResponse {
    fn success(message: impl Into<String>, task_id: Option<i64>, items: Vec<TaskItem>) -> Self {
        Self {
            ok: true,
            task_id,
            items,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// One filtered page of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePageResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub total_matches: u32,
    pub page_count: u32,
    pub message: String,
}

/// Returns the full task collection.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_store(|store| Ok(to_items(store.tasks()))) {
        Ok(items) => TaskListResponse::success("Tasks loaded.", None, items),
        Err(err) => TaskListResponse::failure(format!("task_list failed: {err}")),
    }
}

/// Creates a task; the created task is the last item in the response.
///
/// Missing fields are rejected before storage is opened.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(input: TaskInput) -> TaskListResponse {
    let new_task = match to_new_task(input) {
        Ok(new_task) => new_task,
        Err(err) => return TaskListResponse::failure(format!("task_add rejected: {err}")),
    };

    let result = with_task_store(|store| {
        let tasks = store.add(new_task).map_err(|err| err.to_string())?;
        let created_id = tasks.last().map(|task| task.id);
        Ok((created_id, to_items(tasks)))
    });
    match result {
        Ok((created_id, items)) => TaskListResponse::success("Task created.", created_id, items),
        Err(err) => TaskListResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Deletes a task by id; unknown ids leave the collection unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: i64) -> TaskListResponse {
    let result = with_task_store(|store| {
        Ok(to_items(store.delete(id).map_err(|err| err.to_string())?))
    });
    match result {
        Ok(items) => TaskListResponse::success("Task deleted.", Some(id), items),
        Err(err) => TaskListResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Flips the completion flag of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_complete(id: i64) -> TaskListResponse {
    let result = with_task_store(|store| {
        Ok(to_items(
            store.toggle_complete(id).map_err(|err| err.to_string())?,
        ))
    });
    match result {
        Ok(items) => TaskListResponse::success("Task updated.", Some(id), items),
        Err(err) => TaskListResponse::failure(format!("task_toggle_complete failed: {err}")),
    }
}

/// Replaces the editable fields of task `id`, keeping its completion flag.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(id: i64, input: TaskInput) -> TaskListResponse {
    let fields = match to_new_task(input) {
        Ok(fields) => fields,
        Err(err) => return TaskListResponse::failure(format!("task_edit rejected: {err}")),
    };

    let result = with_task_store(|store| {
        let completed = store.get(id).map_or(false, |task| task.completed);
        let updated = Task {
            completed,
            ..Task::from_new(id, fields)
        };
        Ok(to_items(store.edit(updated).map_err(|err| err.to_string())?))
    });
    match result {
        Ok(items) => TaskListResponse::success("Task updated.", Some(id), items),
        Err(err) => TaskListResponse::failure(format!("task_edit failed: {err}")),
    }
}

/// Filters and paginates the task list.
///
/// Empty filter strings mean "All". `page` is 1-indexed and never clamped;
/// `page_size` defaults to the list view size.
#[flutter_rust_bridge::frb(sync)]
pub fn task_query_visible(
    search_text: String,
    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    page: u32,
    page_size: Option<u32>,
) -> VisiblePageResponse {
    let filter = match to_filter(search_text, category, priority, status) {
        Ok(filter) => filter,
        Err(err) => return visible_failure(format!("task_query_visible rejected: {err}")),
    };
    let request = PageRequest::with_page_size(
        page as usize,
        page_size.map_or(DEFAULT_PAGE_SIZE, |size| size as usize),
    );

    match with_task_store(|store| Ok(store.query_visible(&filter, request))) {
        Ok(visible) => VisiblePageResponse {
            ok: true,
            items: to_items(&visible.items),
            total_matches: saturating_u32(visible.total_matches),
            page_count: saturating_u32(page_count(visible.total_matches, visible.page_size)),
            message: format!("{} matching task(s).", visible.total_matches),
        },
        Err(err) => visible_failure(format!("task_query_visible failed: {err}")),
    }
}

fn visible_failure(message: String) -> VisiblePageResponse {
    VisiblePageResponse {
        ok: false,
        items: Vec::new(),
        total_matches: 0,
        page_count: 0,
        message,
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
        .clone()
}

fn with_task_store<T>(
    f: impl FnOnce(&mut SqliteTaskStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(resolve_db_path()).map_err(|err| format!("storage open failed: {err}"))?;
    let storage = SqliteKeyValueStorage::try_new(&conn)
        .map_err(|err| format!("storage init failed: {err}"))?;
    let mut store = TaskStore::initialize(storage, SystemClock).map_err(|err| {
        warn!("event=ffi_store_init module=ffi status=error error={err}");
        err.to_string()
    })?;
    f(&mut store)
}

fn to_new_task(input: TaskInput) -> Result<NewTask, String> {
    to_draft(input)?
        .into_new_task()
        .map_err(|err| err.to_string())
}

fn to_draft(input: TaskInput) -> Result<TaskDraft, String> {
    let date_time_range = match (input.start_epoch_ms, input.end_epoch_ms) {
        (Some(start), Some(end)) => Some(DateTimeRange::new(
            from_epoch_ms(start)?,
            from_epoch_ms(end)?,
        )),
        _ => None,
    };

    Ok(TaskDraft {
        name: input.name,
        description: input.description,
        priority: non_empty(input.priority)
            .map(|label| label.parse::<Priority>())
            .transpose()
            .map_err(|err| err.to_string())?,
        category: non_empty(input.category)
            .map(|label| label.parse::<Category>())
            .transpose()
            .map_err(|err| err.to_string())?,
        date_time_range,
    })
}

fn to_filter(
    search_text: String,
    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> Result<TaskFilter, String> {
    Ok(TaskFilter {
        search_text,
        category: non_empty(category)
            .map(|label| label.parse::<Category>())
            .transpose()
            .map_err(|err| err.to_string())?,
        priority: non_empty(priority)
            .map(|label| label.parse::<Priority>())
            .transpose()
            .map_err(|err| err.to_string())?,
        status: non_empty(status)
            .map(|label| label.parse::<StatusFilter>())
            .transpose()
            .map_err(|err| err.to_string())?,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

fn from_epoch_ms(millis: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        format!(
            "{} (timestamp {millis} out of range)",
            TaskValidationError::MissingField(TaskField::DateTimeRange)
        )
    })
}

fn to_items(tasks: &[Task]) -> Vec<TaskItem> {
    tasks.iter().map(to_item).collect()
}

fn to_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id,
        name: task.name.clone(),
        description: task.description.clone(),
        priority: task.priority.label().to_string(),
        category: task.category.label().to_string(),
        start_epoch_ms: task.date_time_range.start().timestamp_millis(),
        end_epoch_ms: task.date_time_range.end().timestamp_millis(),
        completed: task.completed,
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, init_storage, log_level_or_default, resolve_db_path,
        task_add, task_delete, task_edit, task_list, task_query_visible, task_toggle_complete,
        TaskInput,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

    fn test_db_path() -> PathBuf {
        TEST_DIR
            .get_or_init(|| tempfile::tempdir().expect("create temp dir"))
            .path()
            .join("tasks.sqlite3")
    }

    fn use_test_storage() {
        let error = init_storage(test_db_path().to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    fn input(name: &str) -> TaskInput {
        TaskInput {
            name: Some(name.to_string()),
            description: Some("ffi description".to_string()),
            priority: Some("Medium".to_string()),
            category: Some("Urgent and Important".to_string()),
            start_epoch_ms: Some(1_700_000_000_000),
            end_epoch_ms: Some(1_700_000_360_000),
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn blank_log_level_falls_back_to_build_default() {
        let expected = if cfg!(debug_assertions) { "debug" } else { "info" };
        assert_eq!(log_level_or_default(""), expected);
        assert_eq!(log_level_or_default("  "), expected);
        assert_eq!(log_level_or_default(" warn "), "warn");
    }

    #[test]
    fn init_storage_rejects_empty_and_conflicting_paths() {
        use_test_storage();
        assert!(!init_storage("  ".to_string()).is_empty());
        assert!(init_storage("/definitely/another.sqlite3".to_string())
            .contains("refusing to switch"));
        assert_eq!(resolve_db_path(), test_db_path());
    }

    #[test]
    fn task_add_rejects_missing_name_without_touching_storage() {
        let response = task_add(TaskInput {
            name: None,
            ..input("unused")
        });
        assert!(!response.ok);
        assert!(response.message.contains("Please enter the task name"));
    }

    #[test]
    fn task_add_rejects_unknown_priority_label() {
        let response = task_add(TaskInput {
            priority: Some("Urgent".to_string()),
            ..input("unused")
        });
        assert!(!response.ok);
        assert!(response.message.contains("unknown priority"));
    }

    // Only this test writes tasks, so clock-derived ids cannot collide with
    // tasks created by other tests running in parallel.
    #[test]
    fn task_operations_roundtrip_through_storage() {
        use_test_storage();
        check_lifecycle();
        check_visible_query();
    }

    fn check_lifecycle() {
        let name = unique_token("ffi-lifecycle");

        let created = task_add(input(&name));
        assert!(created.ok, "{}", created.message);
        let id = created.task_id.expect("created task id");
        let item = created.items.iter().find(|item| item.id == id).unwrap();
        assert_eq!(item.name, name);
        assert_eq!(item.start_epoch_ms, 1_700_000_000_000);
        assert!(!item.completed);

        let toggled = task_toggle_complete(id);
        assert!(toggled.ok, "{}", toggled.message);
        assert!(toggled.items.iter().any(|item| item.id == id && item.completed));

        let edited = task_edit(
            id,
            TaskInput {
                priority: Some("Low".to_string()),
                ..input(&format!("{name}-edited"))
            },
        );
        assert!(edited.ok, "{}", edited.message);
        let item = edited.items.iter().find(|item| item.id == id).unwrap();
        assert_eq!(item.priority, "Low");
        assert!(item.completed);

        let listed = task_list();
        assert!(listed.items.iter().any(|item| item.id == id));

        let deleted = task_delete(id);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.items.iter().all(|item| item.id != id));
    }

    fn check_visible_query() {
        let token = unique_token("ffi-query");
        assert!(task_add(input(&format!("{token} one"))).ok);
        assert!(task_add(input(&format!("{token} two"))).ok);

        let response = task_query_visible(
            token.to_uppercase(),
            None,
            Some(String::new()),
            Some("pending".to_string()),
            1,
            None,
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.total_matches, 2);
        assert_eq!(response.page_count, 1);

        let beyond = task_query_visible(token.clone(), None, None, None, 3, Some(1));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_matches, 2);

        // Both adds may land in the same millisecond, so delete by the first
        // match until nothing carrying the token is left.
        for _ in 0..2 {
            let listed = task_list();
            let id = listed
                .items
                .iter()
                .find(|item| item.name.starts_with(&token))
                .map(|item| item.id)
                .expect("query task still stored");
            assert!(task_delete(id).ok);
        }
        assert!(task_list()
            .items
            .iter()
            .all(|item| !item.name.starts_with(&token)));
    }

    #[test]
    fn task_query_visible_rejects_unknown_status() {
        let response =
            task_query_visible(String::new(), None, None, Some("done".to_string()), 1, None);
        assert!(!response.ok);
    }
}
