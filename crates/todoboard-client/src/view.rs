//! Filtering, sorting and pagination of the loaded todos.
//!
//! [`compute_visible_page`] is pure: the same todos and configuration always
//! produce the same page, and the wall clock is never consulted.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use todoboard_model::{Priority, Todo};

pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => todo.completed,
            StatusFilter::Pending => !todo.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Mid,
    High,
}

impl PriorityFilter {
    fn matches(self, todo: &Todo) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => todo.priority == Priority::Low,
            PriorityFilter::Mid => todo.priority == Priority::Mid,
            PriorityFilter::High => todo.priority == Priority::High,
        }
    }
}

/// Selectable in the configuration but not applied to the candidate set
/// yet: every value keeps all todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DueDateFilter {
    #[default]
    All,
    Today,
    ThisWeek,
    Overdue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Newest first.
    #[default]
    CreatedAt,
    /// Earliest first, undated last.
    DueDate,
    /// High, then mid, then low.
    Priority,
}

impl SortKey {
    fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortKey::CreatedAt => b.created_at.cmp(&a.created_at),
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Priority => b.priority.rank().cmp(&a.priority.rank()),
        }
    }
}

/// What the user currently asked to see. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub due_date: DueDateFilter,
    pub sort: SortKey,
    pub page: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            status: StatusFilter::default(),
            priority: PriorityFilter::default(),
            due_date: DueDateFilter::default(),
            sort: SortKey::default(),
            page: 1,
        }
    }
}

impl ViewConfig {
    // Filter changes go back to the first page; sort changes keep the page.

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_priority(&mut self, priority: PriorityFilter) {
        self.priority = priority;
        self.page = 1;
    }

    pub fn set_due_date(&mut self, due_date: DueDateFilter) {
        self.due_date = due_date;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Pulls `page` back into `1..=total_pages`.
    ///
    /// [`compute_visible_page`] never clamps; callers that shrink the
    /// collection (e.g. deleting the last item of the last page) use this to
    /// avoid showing an empty page.
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePage<'a> {
    pub items: Vec<&'a Todo>,
    pub total_pages: usize,
    /// Number of todos that passed the filters, across all pages.
    pub total_items: usize,
}

impl VisiblePage<'_> {
    /// Whether pager controls are worth showing.
    pub fn needs_pagination(&self) -> bool {
        self.total_items > PAGE_SIZE
    }
}

/// Filters, sorts and slices `todos` for display.
///
/// `status_override` is the dashboard's selected status and, when present,
/// replaces `config.status`. A `config.page` past the last page (or 0)
/// yields no items rather than an error.
pub fn compute_visible_page<'a>(
    todos: &'a [Todo],
    config: &ViewConfig,
    status_override: Option<StatusFilter>,
) -> VisiblePage<'a> {
    let status = status_override.unwrap_or(config.status);

    let mut filtered: Vec<&Todo> = todos
        .iter()
        .filter(|todo| status.matches(todo))
        .filter(|todo| config.priority.matches(todo))
        .collect();

    // Stable, so ties keep collection order.
    filtered.sort_by(|a, b| config.sort.compare(a, b));

    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE).max(1);

    let items = match config.page.checked_sub(1) {
        Some(index) => filtered
            .into_iter()
            .skip(index.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .collect(),
        None => Vec::new(),
    };

    VisiblePage {
        items,
        total_pages,
        total_items,
    }
}

/// Counts shown on the dashboard, over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl DashboardStats {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}
