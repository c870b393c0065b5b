//! Render worker - runs in a dedicated thread

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::debug;

use crate::renderer::OpenError;
use crate::request::{RenderRequest, RenderResponse};
use crate::session::DocumentSession;

/// Main worker function - runs in a dedicated thread.
///
/// Opens the session inside the worker thread so the native handle
/// lives and dies on one thread, and serializes every render through
/// it. Sends [`RenderResponse::DocumentInfo`] once on success or
/// [`RenderResponse::OpenFailed`] and exits.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    open: impl FnOnce() -> Result<DocumentSession, OpenError>,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
) {
    let mut session = match open() {
        Ok(session) => session,
        Err(error) => {
            let _ = responses.send(RenderResponse::OpenFailed { error });
            return;
        }
    };

    let _ = responses.send(RenderResponse::DocumentInfo {
        page_count: session.page_count(),
        title: session.title().map(str::to_owned),
    });

    for request in requests {
        match request {
            RenderRequest::Page { id, index } | RenderRequest::Prefetch { id, index } => {
                match session.render_page(index) {
                    Ok(image) => {
                        let _ = responses.send(RenderResponse::Page {
                            id,
                            index,
                            image: Arc::new(image),
                        });
                    }
                    Err(error) => {
                        let _ = responses.send(RenderResponse::Error { id, index, error });
                    }
                }
            }

            RenderRequest::Shutdown => break,
        }
    }

    debug!("render worker shutting down");
    session.close();
}
