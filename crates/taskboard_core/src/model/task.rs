//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted under the `tasks` key.
//! - Provide form-input validation before any store mutation.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reassigned.
//! - `name` and `description` are non-empty after validation.
//! - `date_time_range` start <= end is assumed, not enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Task identifier derived from creation time in epoch milliseconds.
///
/// Two tasks created within the same millisecond share an id; nothing in
/// core reconciles that case.
pub type TaskId = i64;

/// Task priority, serialized with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Eisenhower-matrix quadrant of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Urgent and Important")]
    UrgentImportant,
    #[serde(rename = "Not Urgent but Important")]
    NotUrgentImportant,
    #[serde(rename = "Urgent but Not Important")]
    UrgentNotImportant,
    #[serde(rename = "Not Urgent and Not Important")]
    NotUrgentNotImportant,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::UrgentImportant,
        Category::NotUrgentImportant,
        Category::UrgentNotImportant,
        Category::NotUrgentNotImportant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::UrgentImportant => "Urgent and Important",
            Self::NotUrgentImportant => "Not Urgent but Important",
            Self::UrgentNotImportant => "Urgent but Not Important",
            Self::NotUrgentNotImportant => "Not Urgent and Not Important",
        }
    }
}

/// Error returned when a label does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub expected: &'static str,
    pub found: String,
}

impl Display for ParseLabelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.expected, self.found)
    }
}

impl Error for ParseLabelError {}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.label() == value)
            .ok_or_else(|| ParseLabelError {
                expected: "priority",
                found: value.to_string(),
            })
    }
}

impl FromStr for Category {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == value)
            .ok_or_else(|| ParseLabelError {
                expected: "category",
                found: value.to_string(),
            })
    }
}

/// Scheduled window of a task, stored as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeRange(pub DateTime<Utc>, pub DateTime<Utc>);

impl DateTimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.1
    }
}

/// Canonical task record.
///
/// Field names on the wire follow the persisted JSON shape
/// (`dateTimeRange`, not `date_time_range`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    pub date_time_range: DateTimeRange,
    pub completed: bool,
}

impl Task {
    /// Builds a pending task from validated creation fields.
    pub fn from_new(id: TaskId, new_task: NewTask) -> Self {
        Self {
            id,
            name: new_task.name,
            description: new_task.description,
            priority: new_task.priority,
            category: new_task.category,
            date_time_range: new_task.date_time_range,
            completed: false,
        }
    }

    /// Validates required text fields.
    ///
    /// # Errors
    /// - Returns `MissingField` for the first blank required field.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        require_text(&self.name, TaskField::Name)?;
        require_text(&self.description, TaskField::Description)?;
        Ok(())
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Validated fields for task creation; `id` and `completed` are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    pub date_time_range: DateTimeRange,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        require_text(&self.name, TaskField::Name)?;
        require_text(&self.description, TaskField::Description)?;
        Ok(())
    }
}

/// Required form fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Name,
    Description,
    Priority,
    Category,
    DateTimeRange,
}

impl TaskField {
    /// User-facing prompt shown when the field is missing.
    pub fn message(self) -> &'static str {
        match self {
            Self::Name => "Please enter the task name",
            Self::Description => "Please enter the task description",
            Self::Priority => "Please select the task priority",
            Self::Category => "Please select a category",
            Self::DateTimeRange => "Please select the date and time range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    MissingField(TaskField),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => f.write_str(field.message()),
        }
    }
}

impl Error for TaskValidationError {}

/// Raw form input where every field may still be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub date_time_range: Option<DateTimeRange>,
}

impl TaskDraft {
    /// Pre-fills a draft from an existing task, as the edit form does.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: Some(task.name.clone()),
            description: Some(task.description.clone()),
            priority: Some(task.priority),
            category: Some(task.category),
            date_time_range: Some(task.date_time_range),
        }
    }

    /// Converts a complete draft into creation fields.
    ///
    /// # Errors
    /// - Returns `MissingField` for the first unset or blank field.
    pub fn into_new_task(self) -> Result<NewTask, TaskValidationError> {
        let name = self.name.filter(|value| !value.trim().is_empty());
        let description = self.description.filter(|value| !value.trim().is_empty());

        Ok(NewTask {
            name: name.ok_or(TaskValidationError::MissingField(TaskField::Name))?,
            description: description
                .ok_or(TaskValidationError::MissingField(TaskField::Description))?,
            priority: self
                .priority
                .ok_or(TaskValidationError::MissingField(TaskField::Priority))?,
            category: self
                .category
                .ok_or(TaskValidationError::MissingField(TaskField::Category))?,
            date_time_range: self
                .date_time_range
                .ok_or(TaskValidationError::MissingField(TaskField::DateTimeRange))?,
        })
    }

    /// Applies the draft over `task`, keeping its `id` and `completed` flag.
    pub fn apply_to(self, task: &Task) -> Result<Task, TaskValidationError> {
        let fields = self.into_new_task()?;
        Ok(Task {
            completed: task.completed,
            ..Task::from_new(task.id, fields)
        })
    }
}

fn require_text(value: &str, field: TaskField) -> Result<(), TaskValidationError> {
    if value.trim().is_empty() {
        return Err(TaskValidationError::MissingField(field));
    }
    Ok(())
}
