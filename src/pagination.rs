//! Page slicing for list endpoints.
//!
//! Out-of-range requests never fail: a page that isn't a number yields the
//! first page. A number past the end (or below 1) yields the last page, or
//! the first page under [`OutOfRange::First`].

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const LIFELIST_PAGE_SIZES: [usize; 3] = [10, 20, 50];
pub const BIRDS_PER_PAGE: usize = 25;
pub const LOCATIONS_PER_PAGE: usize = 25;
pub const LOCATION_SPECIES_PER_PAGE: usize = 20;
pub const LOCATION_SIGHTINGS_PER_PAGE: usize = 50;

/// Items per page, or everything on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Count(usize),
    All,
}

impl PageSize {
    /// Accepts `all` or one of `choices`; anything else is `default`.
    pub fn parse_choice(raw: Option<&str>, choices: &[usize], default: usize) -> Self {
        match raw.map(str::trim) {
            Some("all") => PageSize::All,
            Some(s) => match s.parse::<usize>() {
                Ok(n) if choices.contains(&n) => PageSize::Count(n),
                _ => PageSize::Count(default),
            },
            None => PageSize::Count(default),
        }
    }

    /// Accepts `all` or any positive number; anything else is `default`.
    pub fn parse_lenient(raw: Option<&str>, default: usize) -> Self {
        match raw.map(str::trim) {
            Some("all") => PageSize::All,
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => PageSize::Count(n),
                _ => PageSize::Count(default),
            },
            None => PageSize::Count(default),
        }
    }

    /// The value to echo back to clients, `"all"` or the number.
    pub fn as_param(&self) -> String {
        match self {
            PageSize::Count(n) => n.to_string(),
            PageSize::All => "all".to_string(),
        }
    }
}

/// One page of items plus where it sits in the full list.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Current page number (1-indexed).
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: String,
    pub has_next: bool,
    pub has_prev: bool,
    /// 1-indexed position of the first item on this page, 0 when empty.
    pub start_index: usize,
}

/// Which page a number outside `1..=total_pages` lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    Last,
    First,
}

/// Resolves a raw page parameter against `total_pages`.
fn resolve_page(raw: Option<&str>, total_pages: usize, out_of_range: OutOfRange) -> usize {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => 1,
        Some(s) => match s.parse::<i64>() {
            Err(_) => 1,
            Ok(n) if n < 1 || n as u64 > total_pages as u64 => match out_of_range {
                OutOfRange::Last => total_pages,
                OutOfRange::First => 1,
            },
            Ok(n) => n as usize,
        },
    }
}

pub fn paginate<T>(items: Vec<T>, page: Option<&str>, size: PageSize) -> Page<T> {
    paginate_with(items, page, size, OutOfRange::Last)
}

pub fn paginate_with<T>(
    items: Vec<T>,
    page: Option<&str>,
    size: PageSize,
    out_of_range: OutOfRange,
) -> Page<T> {
    let total_items = items.len();
    let per_page = match size {
        PageSize::Count(n) => n.max(1),
        PageSize::All => total_items.max(1),
    };
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = resolve_page(page, total_pages, out_of_range);

    let offset = (page - 1) * per_page;
    let items: Vec<T> = items.into_iter().skip(offset).take(per_page).collect();
    let start_index = if items.is_empty() { 0 } else { offset + 1 };

    Page {
        items,
        pagination: PageMeta {
            page,
            total_pages,
            total_items,
            page_size: size.as_param(),
            has_next: page < total_pages,
            has_prev: page > 1,
            start_index,
        },
    }
}
