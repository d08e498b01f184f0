//! Derived, never-persisted views over the task collection.
//!
//! # Responsibility
//! - Filter tasks by name search, category, priority and status.
//! - Slice the filtered sequence into fixed-size pages.
//!
//! # Invariants
//! - Filtering happens before pagination.
//! - Out-of-range pages are empty; nothing is clamped.

mod filter;
mod page;

pub use filter::{StatusFilter, TaskFilter};
pub use page::{page_count, query_visible, PageRequest, VisiblePage, DEFAULT_PAGE_SIZE};
