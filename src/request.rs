//! Render request and response types for the background service

use std::sync::Arc;

use crate::renderer::{OpenError, RasterImage, RenderError};

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Render a page the consumer is waiting on
    Page { id: RequestId, index: usize },

    /// Warm a slot ahead of the consumer; nobody blocks on this
    Prefetch { id: RequestId, index: usize },

    /// Shutdown the worker
    Shutdown,
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Document metadata, sent once after the worker opens the document
    DocumentInfo {
        page_count: usize,
        title: Option<String>,
    },

    /// The document could not be opened; the worker has exited
    OpenFailed { error: OpenError },

    /// Rendered page data
    Page {
        id: RequestId,
        index: usize,
        image: Arc<RasterImage>,
    },

    /// Error rendering a page
    Error {
        id: RequestId,
        index: usize,
        error: RenderError,
    },
}
