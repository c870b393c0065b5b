pub mod cache;
pub mod recent;
pub mod renderer;
pub mod request;
pub mod service;
pub mod session;
pub mod settings;
pub mod viewer;
pub mod worker;

#[cfg(feature = "pdf")]
pub mod mupdf_backend;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::{BindObserver, PageCache};
pub use renderer::{
    CloseError, DocumentSource, OpenError, PageRenderer, RasterImage, RenderError,
};
pub use service::RenderService;
pub use session::DocumentSession;
