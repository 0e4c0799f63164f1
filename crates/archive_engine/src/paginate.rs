/// Page-by-page traversal of one listing.
///
/// Bounded listings know their last page up front and are capped by the
/// job maximum. Unbounded listings run until the pipeline sees an empty page
/// or the record cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    base: String,
    next: usize,
    last: Option<usize>,
}

impl Paginator {
    /// Pages `1..=min(total, maximum)`.
    pub fn bounded(base: impl Into<String>, total: usize, maximum: Option<usize>) -> Self {
        let last = maximum.map_or(total, |max| total.min(max));
        Self {
            base: base.into(),
            next: 1,
            last: Some(last),
        }
    }

    pub fn unbounded(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            next: 1,
            last: None,
        }
    }

    pub fn total(&self) -> Option<usize> {
        self.last
    }

    pub fn is_bounded(&self) -> bool {
        self.last.is_some()
    }

    /// Next page number and URL, or `None` once a bounded listing is done.
    pub fn next_page(&mut self) -> Option<(usize, String)> {
        if self.last.is_some_and(|last| self.next > last) {
            return None;
        }
        let page = self.next;
        self.next += 1;
        Some((page, page_url(&self.base, page)))
    }
}

/// `base` with a `page` query parameter appended.
pub fn page_url(base: &str, page: usize) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}page={page}")
}
