use serde::Serialize;
use std::num::NonZeroUsize;

/// Page size shared by every list view.
pub const PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slices an ordered result set into one fixed-size page.
///
/// A missing or zero page number falls back to the first page, a number past
/// the end clamps to the last page. An empty input yields a single empty
/// page. Input ordering is preserved.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page_size: NonZeroUsize, page: Option<u64>) -> Page<T> {
    let size = page_size.get();
    let total_pages = items.len().div_ceil(size).max(1);

    let requested = page.unwrap_or(1).max(1);
    let number = usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(total_pages);

    let items = items
        .into_iter()
        .skip((number - 1) * size)
        .take(size)
        .collect();

    Page {
        items,
        number,
        total_pages,
        has_prev: number > 1,
        has_next: number < total_pages,
    }
}
