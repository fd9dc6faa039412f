use std::fmt::Write;

/// One page of a collection
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
    /// Index of the first item on the page (inclusive)
    pub start_index: usize,
    /// Index one past the last item on the page
    pub end_index: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Number of pages needed for `len` items; an empty collection still has one page
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice `items` into the requested page. Out-of-range pages are clamped.
pub fn paginate<T>(items: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let current_page = current_page.clamp(1, total_pages);

    let start_index = ((current_page - 1) * page_size).min(items.len());
    let end_index = (start_index + page_size).min(items.len());

    Page {
        items: &items[start_index..end_index],
        current_page,
        total_pages,
        start_index,
        end_index,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Page numbers to display: first, last, and the current page with its
/// neighbours. Each gap between them collapses into one ellipsis.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<PageMarker> {
    let total_pages = total_pages.max(1);
    let current_page = current_page.clamp(1, total_pages);

    let mut pages = vec![
        1,
        current_page.saturating_sub(1),
        current_page,
        current_page + 1,
        total_pages,
    ];
    pages.retain(|p| (1..=total_pages).contains(p));
    pages.sort_unstable();
    pages.dedup();

    let mut markers = Vec::with_capacity(pages.len() * 2);
    let mut previous = 0;
    for page in pages {
        if previous != 0 && page > previous + 1 {
            markers.push(PageMarker::Ellipsis);
        }
        markers.push(PageMarker::Page(page));
        previous = page;
    }
    markers
}

/// Render a page window as `« 1 … 4 [5] 6 … 10 »`
pub fn format_page_window(current_page: usize, total_pages: usize) -> String {
    let mut out = String::from("«");
    for marker in page_window(current_page, total_pages) {
        match marker {
            PageMarker::Page(p) if p == current_page => {
                let _ = write!(out, " [{p}]");
            }
            PageMarker::Page(p) => {
                let _ = write!(out, " {p}");
            }
            PageMarker::Ellipsis => out.push_str(" …"),
        }
    }
    out.push_str(" »");
    out
}

/// Bounds-checked page cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        paginate(items, self.page_size, self.current_page)
    }

    /// Returns true when the page actually changed
    pub fn next(&mut self, total_pages: usize) -> bool {
        self.go_to(self.current_page + 1, total_pages)
    }

    pub fn previous(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Move to `page` if it lies within `1..=total_pages`
    pub fn go_to(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages.max(1) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.reset();
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(10)
    }
}
