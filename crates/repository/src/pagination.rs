//! Pagination strategies for list results.
//!
//! - `None`: every matching row, no metadata
//! - `Simple`: one page plus a "has more" flag (no count needed)
//! - `LengthAware`: one page plus the total count and last page number

use serde::{Deserialize, Serialize};

/// Page size used when none is requested
pub const DEFAULT_PER_PAGE: usize = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    #[default]
    None,
    Simple,
    LengthAware,
}

/// How a list result should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSpec {
    pub mode: PaginationMode,
    /// Rows per page; `None` or 0 falls back to `DEFAULT_PER_PAGE`
    pub per_page: Option<usize>,
    /// 1-based page number; 0 is treated as 1
    pub page: usize,
}

impl Default for PaginationSpec {
    fn default() -> Self {
        Self::none()
    }
}

impl PaginationSpec {
    pub fn none() -> Self {
        Self {
            mode: PaginationMode::None,
            per_page: None,
            page: 1,
        }
    }

    pub fn simple(per_page: Option<usize>) -> Self {
        Self {
            mode: PaginationMode::Simple,
            per_page,
            page: 1,
        }
    }

    pub fn length_aware(per_page: Option<usize>) -> Self {
        Self {
            mode: PaginationMode::LengthAware,
            per_page,
            page: 1,
        }
    }

    /// Select a page (builder pattern).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(&self) -> usize {
        self.per_page
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    pub fn current_page(&self) -> usize {
        self.page.max(1)
    }

    /// Shape already ordered rows according to this spec.
    ///
    /// Pages are contiguous slices of `rows`; a page past the end is empty.
    pub fn paginate<R>(&self, rows: Vec<R>) -> PagedResult<R> {
        let per_page = self.page_size();
        let page = self.current_page();
        let offset = (page - 1).saturating_mul(per_page);

        match self.mode {
            PaginationMode::None => PagedResult::All { items: rows },
            PaginationMode::Simple => {
                // One extra row tells us whether another page exists
                let mut items: Vec<R> = rows
                    .into_iter()
                    .skip(offset)
                    .take(per_page.saturating_add(1))
                    .collect();
                let has_more = items.len() > per_page;
                items.truncate(per_page);
                PagedResult::Simple {
                    items,
                    page,
                    per_page,
                    has_more,
                }
            }
            PaginationMode::LengthAware => {
                let total = rows.len();
                let items = rows.into_iter().skip(offset).take(per_page).collect();
                PagedResult::LengthAware {
                    items,
                    page,
                    per_page,
                    total,
                    last_page: total.div_ceil(per_page),
                }
            }
        }
    }
}

/// Result of a list operation, shaped by its `PaginationMode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "pagination", rename_all = "snake_case")]
pub enum PagedResult<R> {
    All {
        items: Vec<R>,
    },
    Simple {
        items: Vec<R>,
        page: usize,
        per_page: usize,
        has_more: bool,
    },
    LengthAware {
        items: Vec<R>,
        page: usize,
        per_page: usize,
        /// Every matching row, ignoring page bounds
        total: usize,
        last_page: usize,
    },
}

impl<R> PagedResult<R> {
    pub fn items(&self) -> &[R] {
        match self {
            PagedResult::All { items }
            | PagedResult::Simple { items, .. }
            | PagedResult::LengthAware { items, .. } => items,
        }
    }

    pub fn into_items(self) -> Vec<R> {
        match self {
            PagedResult::All { items }
            | PagedResult::Simple { items, .. }
            | PagedResult::LengthAware { items, .. } => items,
        }
    }

    /// Total match count, when the strategy computes one
    pub fn total(&self) -> Option<usize> {
        match self {
            PagedResult::All { items } => Some(items.len()),
            PagedResult::Simple { .. } => None,
            PagedResult::LengthAware { total, .. } => Some(*total),
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Transform every item while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(R) -> U) -> PagedResult<U> {
        match self {
            PagedResult::All { items } => PagedResult::All {
                items: items.into_iter().map(f).collect(),
            },
            PagedResult::Simple {
                items,
                page,
                per_page,
                has_more,
            } => PagedResult::Simple {
                items: items.into_iter().map(f).collect(),
                page,
                per_page,
                has_more,
            },
            PagedResult::LengthAware {
                items,
                page,
                per_page,
                total,
                last_page,
            } => PagedResult::LengthAware {
                items: items.into_iter().map(f).collect(),
                page,
                per_page,
                total,
                last_page,
            },
        }
    }
}
