//! Document session: exclusive ownership of one open renderer handle

use log::warn;

use crate::renderer::{PageRenderer, RasterImage, RenderError};

#[cfg(feature = "pdf")]
use crate::mupdf_backend::MupdfRenderer;
#[cfg(feature = "pdf")]
use crate::renderer::{DocumentSource, OpenError};

/// An open handle to one paginated document plus its page count.
///
/// The session exclusively owns the underlying native resource. It is
/// opened once, closed at most once, and never reused after close:
/// any render after [`DocumentSession::close`] fails with
/// [`RenderError::Closed`].
pub struct DocumentSession {
    renderer: Option<Box<dyn PageRenderer>>,
    page_count: usize,
    title: Option<String>,
    scale: f32,
}

impl DocumentSession {
    /// Wrap an already-opened renderer backend.
    ///
    /// The page count and title are captured here and stay fixed for
    /// the session's lifetime.
    #[must_use]
    pub fn new(renderer: Box<dyn PageRenderer>, scale: f32) -> Self {
        let page_count = renderer.page_count();
        let title = renderer.title().map(str::to_owned);
        Self {
            renderer: Some(renderer),
            page_count,
            title,
            scale,
        }
    }

    /// Open a session over the bundled MuPDF backend.
    #[cfg(feature = "pdf")]
    pub fn open(source: &DocumentSource, scale: f32) -> Result<Self, OpenError> {
        let renderer = MupdfRenderer::open(source)?;
        Ok(Self::new(Box::new(renderer), scale))
    }

    /// Number of pages in the document. Zero-page documents are valid.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Document title metadata, if any
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Scale the session renders at
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rasterize one page.
    ///
    /// The per-page native resource is opened and released within this
    /// call. Errors are reported to the caller and never retried.
    ///
    /// # Panics
    ///
    /// `index` must satisfy `index < page_count()`. Violating this is
    /// a caller bug and fails fast; it is never clamped.
    pub fn render_page(&mut self, index: usize) -> Result<RasterImage, RenderError> {
        assert!(
            index < self.page_count,
            "page index {index} out of range for document with {} pages",
            self.page_count
        );

        let Some(renderer) = self.renderer.as_mut() else {
            return Err(RenderError::Closed);
        };

        renderer.render_page(index, self.scale)
    }

    /// Whether [`DocumentSession::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.renderer.is_none()
    }

    /// Release the native handle.
    ///
    /// Idempotent. Backend close failures are logged and swallowed;
    /// they are never fatal.
    pub fn close(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            if let Err(e) = renderer.close() {
                warn!("closing document: {e}");
            }
        }
    }
}

impl Drop for DocumentSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeRenderer;

    fn session(pages: usize) -> DocumentSession {
        DocumentSession::new(Box::new(FakeRenderer::new(pages)), 1.0)
    }

    #[test]
    fn captures_page_count_at_open() {
        let session = session(7);
        assert_eq!(session.page_count(), 7);
    }

    #[test]
    fn zero_page_document_opens() {
        let session = session(0);
        assert_eq!(session.page_count(), 0);
        assert!(!session.is_closed());
    }

    #[test]
    fn renders_within_range() {
        let mut session = session(3);
        let image = session.render_page(2).unwrap();
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let mut session = session(3);
        let _ = session.render_page(3);
    }

    #[test]
    fn render_after_close_fails_deterministically() {
        let mut session = session(3);
        session.close();
        assert!(matches!(session.render_page(0), Err(RenderError::Closed)));
        assert!(matches!(session.render_page(1), Err(RenderError::Closed)));
    }

    #[test]
    fn close_is_idempotent() {
        let mut session = session(3);
        session.close();
        session.close();
        assert!(session.is_closed());
    }

    #[test]
    fn close_failure_is_swallowed() {
        let mut session =
            DocumentSession::new(Box::new(FakeRenderer::new(1).failing_close()), 1.0);
        session.close();
        assert!(session.is_closed());
    }
}
