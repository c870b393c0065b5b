//! Background render service: the cache with renders off the
//! interactive path

use std::sync::Arc;
use std::thread::JoinHandle;

use flume::{Receiver, Sender};
use log::warn;

use crate::renderer::{OpenError, RasterImage, RenderError};
use crate::request::{RenderRequest, RenderResponse, RequestId};
use crate::session::DocumentSession;
use crate::worker::render_worker;

/// Per-slot render state.
///
/// `Empty -> Rendering -> Filled`; there is no transition out of
/// `Filled` (nothing evicts or invalidates).
#[derive(Clone, Debug)]
enum Slot {
    Empty,
    Rendering,
    Filled(Arc<RasterImage>),
}

/// Same contract as [`crate::cache::PageCache`], with renders running
/// on a dedicated worker thread that owns the session.
///
/// The `Empty -> Rendering` transition happens on the consumer side
/// before a request is enqueued, so two look-ahead triggers for the
/// same index can never double-render. `get` on a `Rendering` slot
/// waits for the in-flight render instead of starting a second one.
pub struct RenderService {
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    worker: Option<JoinHandle<()>>,
    slots: Vec<Slot>,
    page_count: usize,
    title: Option<String>,
    next_request_id: u64,
}

impl RenderService {
    /// Spawn the worker and open the document inside it.
    ///
    /// Blocks until the worker reports the page count or an open
    /// failure.
    pub fn open<F>(open: F) -> Result<Self, OpenError>
    where
        F: FnOnce() -> Result<DocumentSession, OpenError> + Send + 'static,
    {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let worker = std::thread::spawn(move || {
            render_worker(open, request_rx, response_tx);
        });

        match response_rx.recv() {
            Ok(RenderResponse::DocumentInfo { page_count, title }) => Ok(Self {
                request_tx,
                response_rx,
                worker: Some(worker),
                slots: vec![Slot::Empty; page_count],
                page_count,
                title,
                next_request_id: 1,
            }),
            Ok(RenderResponse::OpenFailed { error }) => {
                let _ = worker.join();
                Err(error)
            }
            Ok(_) | Err(_) => {
                let _ = worker.join();
                Err(OpenError::invalid("render worker exited before opening"))
            }
        }
    }

    /// Number of pages in the document
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Document title metadata, if any
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Whether the slot for `index` is filled
    #[must_use]
    pub fn is_cached(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Filled(_)))
    }

    /// Return the image for `index`, blocking on the render if the
    /// slot is empty or already in flight.
    ///
    /// # Panics
    ///
    /// `index` must satisfy `index < page_count()`; out-of-range
    /// requests are a caller bug and fail fast.
    pub fn get(&mut self, index: usize) -> Result<Arc<RasterImage>, RenderError> {
        assert!(
            index < self.page_count,
            "page index {index} out of range for document with {} pages",
            self.page_count
        );

        self.drain_responses();

        match &self.slots[index] {
            Slot::Filled(image) => return Ok(Arc::clone(image)),
            Slot::Rendering => {}
            Slot::Empty => {
                let id = self.next_id();
                if self
                    .request_tx
                    .send(RenderRequest::Page { id, index })
                    .is_err()
                {
                    return Err(RenderError::Closed);
                }
                self.slots[index] = Slot::Rendering;
            }
        }

        self.wait_for(index)
    }

    /// Obtain the image for a page that just became visible, then
    /// queue a render one page ahead without waiting on it.
    pub fn bind(&mut self, index: usize) -> Result<Arc<RasterImage>, RenderError> {
        let image = self.get(index)?;

        let next = index + 1;
        if next < self.page_count && matches!(self.slots[next], Slot::Empty) {
            let id = self.next_id();
            if self
                .request_tx
                .send(RenderRequest::Prefetch { id, index: next })
                .is_ok()
            {
                self.slots[next] = Slot::Rendering;
            }
        }

        Ok(image)
    }

    /// Stop the worker and release the document. Idempotent; also
    /// runs on drop. Filled slots stay readable; anything else fails
    /// with [`RenderError::Closed`] afterwards.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.request_tx.send(RenderRequest::Shutdown);
            if worker.join().is_err() {
                warn!("render worker panicked during shutdown");
            }
            self.drain_responses();
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            self.apply_response(response);
        }
    }

    /// Block until a response for `index` arrives, applying every
    /// other response (prefetch completions) along the way.
    fn wait_for(&mut self, index: usize) -> Result<Arc<RasterImage>, RenderError> {
        loop {
            match self.response_rx.recv() {
                Ok(response) => {
                    if let Some((done, result)) = self.apply_response(response) {
                        if done == index {
                            return result;
                        }
                    }
                }
                // Worker gone: no render can ever complete
                Err(_) => return Err(RenderError::Closed),
            }
        }
    }

    fn apply_response(
        &mut self,
        response: RenderResponse,
    ) -> Option<(usize, Result<Arc<RasterImage>, RenderError>)> {
        match response {
            RenderResponse::Page { index, image, .. } => {
                self.slots[index] = Slot::Filled(Arc::clone(&image));
                Some((index, Ok(image)))
            }
            RenderResponse::Error { index, error, .. } => {
                warn!("render of page {index} failed: {error}");
                self.slots[index] = Slot::Empty;
                Some((index, Err(error)))
            }
            RenderResponse::DocumentInfo { .. } | RenderResponse::OpenFailed { .. } => None,
        }
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
