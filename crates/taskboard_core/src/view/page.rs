use crate::model::task::Task;
use crate::view::filter::TaskFilter;

/// Items per page in the task list.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// 1-indexed page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Index range of this page within the filtered sequence.
    ///
    /// Page `0` has no range; a zero page size yields an empty range.
    fn bounds(self) -> Option<(usize, usize)> {
        let start = self.page.checked_sub(1)?.checked_mul(self.page_size)?;
        Some((start, start.saturating_add(self.page_size)))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One page of filtered tasks plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePage {
    pub items: Vec<Task>,
    pub total_matches: usize,
    pub page_size: usize,
}

impl VisiblePage {
    pub fn page_count(&self) -> usize {
        page_count(self.total_matches, self.page_size)
    }
}

/// Number of pages needed for `total` items, `ceil(total / page_size)`.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Filters `tasks` and returns the requested page.
pub fn query_visible(tasks: &[Task], filter: &TaskFilter, page: PageRequest) -> VisiblePage {
    let predicate = filter.predicate();
    let matching: Vec<&Task> = tasks.iter().filter(|&task| predicate(task)).collect();
    let total_matches = matching.len();

    let items = match page.bounds() {
        Some((start, end)) if start < total_matches => matching[start..end.min(total_matches)]
            .iter()
            .map(|task| (*task).clone())
            .collect(),
        _ => Vec::new(),
    };

    VisiblePage {
        items,
        total_matches,
        page_size: page.page_size,
    }
}
