use crate::model::task::{Category, ParseLabelError, Priority, Task};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Completion-state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, completed: bool) -> bool {
        match self {
            Self::Completed => completed,
            Self::Pending => !completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => Err(ParseLabelError {
                expected: "status",
                found: other.to_string(),
            }),
        }
    }
}

/// Transient list filter; every unset clause matches all tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of `Task::name`. Empty matches everything.
    pub search_text: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<StatusFilter>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.predicate()(task)
    }

    /// Returns a predicate with the search needle lowercased once.
    pub(crate) fn predicate(&self) -> impl Fn(&Task) -> bool + '_ {
        let needle = self.search_text.to_lowercase();
        move |task: &Task| {
            task.name.to_lowercase().contains(needle.as_str())
                && self.category.map_or(true, |category| task.category == category)
                && self.priority.map_or(true, |priority| task.priority == priority)
                && self.status.map_or(true, |status| status.matches(task.completed))
        }
    }
}
