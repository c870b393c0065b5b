//! Per-page render cache with one-page look-ahead

use std::sync::Arc;

use log::warn;

use crate::renderer::{RasterImage, RenderError};
use crate::session::DocumentSession;

/// Observer notified when a page becomes the visible item.
///
/// The original consumer used this hook to drive a page-counter
/// display; the cache itself holds no display state.
pub trait BindObserver {
    fn on_bound(&mut self, index: usize, page_count: usize);
}

/// Maps page index to a rendered image, rendering lazily on first
/// request and evicting never.
///
/// The slot array is sized exactly to the document's page count at
/// construction. A filled slot is always a correctly-rendered page
/// for its index and is never re-rendered or invalidated: the source
/// document is assumed immutable for the session's lifetime. Peak
/// memory is O(page count); unbounded documents are out of scope.
pub struct PageCache {
    session: DocumentSession,
    slots: Vec<Option<Arc<RasterImage>>>,
    observers: Vec<Box<dyn BindObserver>>,
}

impl PageCache {
    /// Create a cache over an open session, one empty slot per page.
    #[must_use]
    pub fn new(session: DocumentSession) -> Self {
        let slots = std::iter::repeat_with(|| None)
            .take(session.page_count())
            .collect();
        Self {
            session,
            slots,
            observers: Vec::new(),
        }
    }

    /// Number of pages (and slots)
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the slot for `index` is filled
    #[must_use]
    pub fn is_cached(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    /// Register an observer for [`PageCache::bind`] notifications
    pub fn add_observer(&mut self, observer: Box<dyn BindObserver>) {
        self.observers.push(observer);
    }

    /// Return the image for `index`, rendering it on first request.
    ///
    /// A hit returns the stored image with no render; a miss renders
    /// synchronously, fills the slot, and returns it. Render errors
    /// propagate and leave the slot empty.
    ///
    /// # Panics
    ///
    /// `index` must satisfy `index < page_count()`; out-of-range
    /// requests are a caller bug and fail fast.
    pub fn get(&mut self, index: usize) -> Result<Arc<RasterImage>, RenderError> {
        assert!(
            index < self.slots.len(),
            "page index {index} out of range for cache with {} slots",
            self.slots.len()
        );

        if let Some(image) = &self.slots[index] {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(self.session.render_page(index)?);
        self.slots[index] = Some(Arc::clone(&image));
        Ok(image)
    }

    /// Obtain the image for a page that just became visible, then warm
    /// the slot one page ahead.
    ///
    /// Look-ahead renders exactly `index + 1`, never backward and
    /// never further, and only if that slot is still empty. A failed
    /// look-ahead is logged and leaves its slot empty; the error
    /// surfaces to whoever requests that page directly.
    pub fn bind(&mut self, index: usize) -> Result<Arc<RasterImage>, RenderError> {
        let image = self.get(index)?;

        let page_count = self.slots.len();
        for observer in &mut self.observers {
            observer.on_bound(index, page_count);
        }

        let next = index + 1;
        if next < page_count && self.slots[next].is_none() {
            match self.session.render_page(next) {
                Ok(rendered) => self.slots[next] = Some(Arc::new(rendered)),
                Err(e) => warn!("look-ahead render of page {next} failed: {e}"),
            }
        }

        Ok(image)
    }

    /// Close the underlying session. Filled slots stay readable
    /// through [`PageCache::get`]; empty ones fail with
    /// [`RenderError::Closed`] from then on.
    pub fn close(&mut self) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeRenderer;

    fn cache(pages: usize) -> (PageCache, crate::test_utils::RenderLog) {
        let renderer = FakeRenderer::new(pages);
        let log = renderer.render_log();
        (
            PageCache::new(DocumentSession::new(Box::new(renderer), 1.0)),
            log,
        )
    }

    #[test]
    fn get_renders_once_then_hits() {
        let (mut cache, log) = cache(3);

        let first = cache.get(0).unwrap();
        let second = cache.get(0).unwrap();

        assert_eq!(log.lock().unwrap().as_slice(), &[0]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn bind_prefetches_exactly_one_page_ahead() {
        let (mut cache, log) = cache(3);

        let image = cache.bind(0).unwrap();
        assert_eq!(image.width, FakeRenderer::dimensions_for(0).0);

        assert!(cache.is_cached(0));
        assert!(cache.is_cached(1));
        assert!(!cache.is_cached(2));
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1]);
    }

    #[test]
    fn bind_skips_prefetch_of_filled_slot() {
        let (mut cache, log) = cache(3);

        cache.bind(0).unwrap();
        cache.bind(1).unwrap();

        // Page 1 came from the earlier look-ahead: no render for it,
        // one render for page 2.
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1, 2]);
        assert_eq!(cache.cached_len(), 3);
    }

    #[test]
    fn three_page_scroll_scenario() {
        let (mut cache, log) = cache(3);

        cache.bind(0).unwrap();
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1]);

        cache.bind(1).unwrap();
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1, 2]);

        cache.bind(2).unwrap();
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn burst_binds_never_run_ahead() {
        let (mut cache, log) = cache(8);

        for index in 0..4 {
            cache.bind(index).unwrap();
            let rendered = log.lock().unwrap();
            assert!(
                rendered.iter().all(|&page| page <= index + 1),
                "bind({index}) rendered past page {}: {rendered:?}",
                index + 1
            );
        }

        assert!(!cache.is_cached(5));
    }

    #[test]
    fn last_page_bind_has_no_lookahead() {
        let (mut cache, log) = cache(3);

        cache.bind(2).unwrap();

        assert_eq!(log.lock().unwrap().as_slice(), &[2]);
        assert_eq!(cache.cached_len(), 1);
    }

    #[test]
    fn zero_page_document_yields_zero_slots() {
        let (cache, _log) = cache(0);
        assert_eq!(cache.page_count(), 0);
        assert_eq!(cache.cached_len(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        let (mut cache, _log) = cache(3);
        let _ = cache.get(3);
    }

    #[test]
    fn lookahead_failure_leaves_slot_empty() {
        let renderer = FakeRenderer::new(3).fail_on(1);
        let log = renderer.render_log();
        let mut cache = PageCache::new(DocumentSession::new(Box::new(renderer), 1.0));

        // bind(0) succeeds even though the look-ahead of page 1 fails
        cache.bind(0).unwrap();
        assert!(cache.is_cached(0));
        assert!(!cache.is_cached(1));

        // the error surfaces on a direct request
        assert!(cache.get(1).is_err());
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1, 1]);
    }

    #[test]
    fn get_after_close_hits_filled_slots_only() {
        let (mut cache, log) = cache(3);

        cache.bind(0).unwrap();
        cache.close();

        assert!(cache.get(0).is_ok());
        assert!(cache.get(1).is_ok());
        assert!(matches!(cache.get(2), Err(RenderError::Closed)));
        assert_eq!(log.lock().unwrap().as_slice(), &[0, 1]);
    }

    #[test]
    fn observers_see_every_bind() {
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<(usize, usize)>>>);
        impl BindObserver for Recorder {
            fn on_bound(&mut self, index: usize, page_count: usize) {
                self.0.borrow_mut().push((index, page_count));
            }
        }

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let (mut cache, _log) = cache(3);
        cache.add_observer(Box::new(Recorder(std::rc::Rc::clone(&seen))));

        cache.bind(0).unwrap();
        cache.bind(2).unwrap();

        assert_eq!(seen.borrow().as_slice(), &[(0, 3), (2, 3)]);
    }
}
