//! Page requests and page/slice envelopes.
//!
//! # Invariants
//! - Page numbers are zero-based.
//! - Page size is never 0: `0` falls back to `DEFAULT_PAGE_SIZE` and values
//!   above `MAX_PAGE_SIZE` are clamped.

use super::sort::{Sort, SortField};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Zero-based page number, page size and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    page: u32,
    size: u32,
    sort: Sort<F>,
}

impl<F: SortField> PageRequest<F> {
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size: normalize_page_size(size),
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort<F>) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort<F> {
        &self.sort
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }

    pub fn previous_or_first(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }
}

/// Normalizes a requested page size.
pub fn normalize_page_size(size: u32) -> u32 {
    match size {
        0 => DEFAULT_PAGE_SIZE,
        value if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        value => value,
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, number: u32, size: u32, total_elements: u64) -> Self {
        Self {
            content,
            number,
            size: normalize_page_size(size),
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Converts page content while keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// One page of results that only knows whether another page follows.
///
/// Produced without a count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    has_next: bool,
}

impl<T> Slice<T> {
    pub fn new(content: Vec<T>, number: u32, size: u32, has_next: bool) -> Self {
        Self {
            content,
            number,
            size: normalize_page_size(size),
            has_next,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Slice<U> {
        Slice {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_size, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
    use crate::query::sort::MemberField;

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(normalize_page_size(0), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(7), 7);
        assert_eq!(normalize_page_size(MAX_PAGE_SIZE + 1), MAX_PAGE_SIZE);
    }

    #[test]
    fn request_offset_is_page_times_size() {
        let request = PageRequest::<MemberField>::of(3, 25);
        assert_eq!(request.offset(), 75);
        assert_eq!(request.next().page(), 4);
        assert_eq!(PageRequest::<MemberField>::of(0, 5).previous_or_first().page(), 0);
    }

    #[test]
    fn page_metadata_for_middle_and_last_page() {
        let middle = Page::new(vec![4, 5, 6], 1, 3, 8);
        assert_eq!(middle.total_pages(), 3);
        assert!(middle.has_next());
        assert!(middle.has_previous());
        assert!(!middle.is_first());

        let last = Page::new(vec![7, 8], 2, 3, 8);
        assert!(last.is_last());
        assert!(!last.has_next());
    }

    #[test]
    fn empty_page_has_no_pages() {
        let page: Page<u8> = Page::new(Vec::new(), 0, 10, 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(page.is_last());
        assert!(!page.has_content());
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 0, 2, 5).map(|value| value * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.total_elements(), 5);
        assert_eq!(page.total_pages(), 3);
    }
}
