//! Derived reads for a scrolling consumer: visible range and page counter

use crate::cache::BindObserver;

/// Which page indices a virtualized scroll view currently displays.
///
/// `last_fully_visible` is `None` while no page fits entirely in the
/// viewport (e.g. a page taller than the screen).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    /// First (partially) visible page index
    pub first: usize,
    /// Last (partially) visible page index
    pub last: usize,
    /// Last page that is completely inside the viewport, if any
    pub last_fully_visible: Option<usize>,
}

impl VisibleRange {
    /// A single page filling the viewport
    #[must_use]
    pub const fn single(index: usize) -> Self {
        Self {
            first: index,
            last: index,
            last_fully_visible: Some(index),
        }
    }
}

/// Format the `"{current} of {total}"` page counter.
///
/// Prefers the last fully visible page and falls back to the last
/// partially visible one. Hidden (`None`) while no document is open
/// or the document has no pages.
#[must_use]
pub fn page_counter(range: VisibleRange, page_count: usize) -> Option<String> {
    if page_count == 0 {
        return None;
    }

    let current = range.last_fully_visible.unwrap_or(range.last) + 1;
    Some(format!("{current} of {page_count}"))
}

/// Bind observer retaining the most recently bound page for display.
#[derive(Debug, Default)]
pub struct PageCounter {
    current: Option<usize>,
    page_count: usize,
}

impl PageCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter label for the last bound page, once one was bound
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let current = self.current?;
        page_counter(VisibleRange::single(current), self.page_count)
    }
}

impl BindObserver for PageCounter {
    fn on_bound(&mut self, index: usize, page_count: usize) {
        self.current = Some(index);
        self.page_count = page_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_prefers_last_fully_visible() {
        let range = VisibleRange {
            first: 3,
            last: 5,
            last_fully_visible: Some(4),
        };
        assert_eq!(page_counter(range, 10).as_deref(), Some("5 of 10"));
    }

    #[test]
    fn counter_falls_back_to_last_visible() {
        let range = VisibleRange {
            first: 3,
            last: 5,
            last_fully_visible: None,
        };
        assert_eq!(page_counter(range, 10).as_deref(), Some("6 of 10"));
    }

    #[test]
    fn counter_hidden_for_empty_document() {
        assert_eq!(page_counter(VisibleRange::single(0), 0), None);
    }

    #[test]
    fn page_counter_observer_tracks_last_bind() {
        let mut counter = PageCounter::new();
        assert_eq!(counter.label(), None);

        counter.on_bound(0, 3);
        assert_eq!(counter.label().as_deref(), Some("1 of 3"));

        counter.on_bound(2, 3);
        assert_eq!(counter.label().as_deref(), Some("3 of 3"));
    }
}
