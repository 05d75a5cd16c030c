use serde::Serialize;

/// One page of a view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub page_count: usize,
    pub clamped_page: usize,
    pub start_index: usize,
    pub slice: &'a [T],
}

impl<T> Page<'_, T> {
    pub fn info(&self, total: usize) -> String {
        page_info(self.clamped_page, self.page_count, total)
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Slices `view` for `page`. Out-of-range pages (zero, negative or past the end)
/// are clamped, never rejected. A zero page size behaves as one.
pub fn paginate<T>(view: &[T], page: i64, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let page_count = page_count(view.len(), page_size);
    let clamped_page = clamp_page(page, page_count);
    let start_index = (clamped_page - 1) * page_size;
    let end = (start_index + page_size).min(view.len());
    let slice = view.get(start_index..end).unwrap_or(&[]);
    Page {
        page_count,
        clamped_page,
        start_index,
        slice,
    }
}

pub fn clamp_page(page: i64, page_count: usize) -> usize {
    if page < 1 {
        return 1;
    }
    usize::try_from(page)
        .unwrap_or(usize::MAX)
        .min(page_count.max(1))
}

pub fn page_info(page: usize, page_count: usize, total: usize) -> String {
    let noun = if total == 1 { "result" } else { "results" };
    format!("Page {page} of {page_count} ({total} {noun})")
}
