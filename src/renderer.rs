//! Renderer seam: raster types, the page-renderer capability, and errors

use std::path::{Path, PathBuf};

/// A rendered page: pre-multiplied RGBA, `width * height * 4` bytes.
///
/// Immutable once produced. The cache keeps a back reference via `Arc`
/// while ownership of the display copy rests with the consumer.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels, taken from the source page at render time
    pub width: u32,
    /// Height in pixels, taken from the source page at render time
    pub height: u32,
    /// Pre-multiplied RGBA samples, row-major, no padding
    pub pixels: Vec<u8>,
}

impl RasterImage {
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("byte_len", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

/// A byte-seekable document input.
///
/// The surrounding application obtains this (e.g. from a file picker)
/// and hands it to [`crate::session::DocumentSession::open`].
#[derive(Clone, Debug)]
pub enum DocumentSource {
    /// A document on the filesystem
    Path(PathBuf),
    /// An in-memory document
    Bytes(Vec<u8>),
}

impl DocumentSource {
    /// Filesystem path of this source, if it has one
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Bytes(_) => None,
        }
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// The source could not be opened or is not a valid document.
///
/// Reported to the caller, never retried internally.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("failed to read document source: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid document: {detail}")]
    Invalid { detail: String },
}

impl OpenError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid { detail: msg.into() }
    }
}

/// A page could not be rasterized, or the session is already closed.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("document session is closed")]
    Closed,

    #[error("render engine: {detail}")]
    Engine { detail: String },
}

impl RenderError {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine { detail: msg.into() }
    }
}

/// Failure releasing the native document handle. Never fatal, only logged.
#[derive(Debug, thiserror::Error)]
#[error("failed to release document: {detail}")]
pub struct CloseError {
    pub detail: String,
}

impl CloseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { detail: msg.into() }
    }
}

/// Narrow capability over a platform page-rendering facility.
///
/// Implementations own one open document. The page count is fixed for
/// the lifetime of the handle; `render_page` is a blocking operation
/// that opens and releases the per-page native resource within the
/// call. Callers must keep `index` within `0..page_count()`.
pub trait PageRenderer {
    /// Number of pages in the open document
    fn page_count(&self) -> usize;

    /// Document title metadata, if the format carries one
    fn title(&self) -> Option<&str> {
        None
    }

    /// Rasterize one page at the given scale into pre-multiplied RGBA
    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage, RenderError>;

    /// Release resources that dropping alone cannot report on
    fn close(&mut self) -> Result<(), CloseError> {
        Ok(())
    }
}
