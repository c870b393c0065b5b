//! Deterministic fake renderer for tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::renderer::{CloseError, PageRenderer, RasterImage, RenderError};

/// Shared log of page indices handed to `render_page`, in call order.
pub type RenderLog = Arc<Mutex<Vec<usize>>>;

/// In-memory [`PageRenderer`] with deterministic output.
///
/// Every page gets distinct dimensions and a pixel fill derived from
/// its index, so repeated renders of the same page are bit-identical
/// and pages are distinguishable from each other.
pub struct FakeRenderer {
    dimensions: Vec<(u32, u32)>,
    render_log: RenderLog,
    fail_on: HashSet<usize>,
    fail_close: bool,
}

impl FakeRenderer {
    #[must_use]
    pub fn new(page_count: usize) -> Self {
        let dimensions = (0..page_count).map(Self::dimensions_for).collect();
        Self {
            dimensions,
            render_log: Arc::new(Mutex::new(Vec::new())),
            fail_on: HashSet::new(),
            fail_close: false,
        }
    }

    /// Natural dimensions the fake assigns to page `index`
    #[must_use]
    pub fn dimensions_for(index: usize) -> (u32, u32) {
        (12 + index as u32, 20)
    }

    /// Handle to the render-call log
    #[must_use]
    pub fn render_log(&self) -> RenderLog {
        Arc::clone(&self.render_log)
    }

    /// Make renders of `index` fail
    #[must_use]
    pub fn fail_on(mut self, index: usize) -> Self {
        self.fail_on.insert(index);
        self
    }

    /// Make `close` report a failure
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

impl PageRenderer for FakeRenderer {
    fn page_count(&self) -> usize {
        self.dimensions.len()
    }

    fn title(&self) -> Option<&str> {
        Some("fake document")
    }

    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage, RenderError> {
        self.render_log.lock().unwrap().push(index);

        if self.fail_on.contains(&index) {
            return Err(RenderError::engine(format!("injected failure on page {index}")));
        }

        let (w, h) = self.dimensions[index];
        let width = ((w as f32) * scale).round().max(1.0) as u32;
        let height = ((h as f32) * scale).round().max(1.0) as u32;
        Ok(RasterImage {
            width,
            height,
            pixels: vec![index as u8; (width * height * 4) as usize],
        })
    }

    fn close(&mut self) -> Result<(), CloseError> {
        if self.fail_close {
            Err(CloseError::new("injected close failure"))
        } else {
            Ok(())
        }
    }
}
