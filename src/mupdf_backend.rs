//! MuPDF-backed page renderer

use mupdf::{Colorspace, Document, Matrix, Pixmap};

use crate::renderer::{
    DocumentSource, OpenError, PageRenderer, RasterImage, RenderError,
};

/// [`PageRenderer`] over an open [`mupdf::Document`].
///
/// The native handle is released when the renderer drops.
pub struct MupdfRenderer {
    doc: Document,
    page_count: usize,
    title: Option<String>,
}

impl MupdfRenderer {
    /// Open a document from a path or in-memory bytes.
    ///
    /// Zero-page documents open successfully; unreadable or malformed
    /// sources fail with [`OpenError`].
    pub fn open(source: &DocumentSource) -> Result<Self, OpenError> {
        let doc = match source {
            DocumentSource::Path(path) => {
                // Surface unreadable files as I/O errors rather than
                // engine noise
                std::fs::metadata(path)?;
                Document::open(path.to_string_lossy().as_ref())
                    .map_err(|e| OpenError::invalid(e.to_string()))?
            }
            DocumentSource::Bytes(bytes) => Document::from_bytes(bytes, "application/pdf")
                .map_err(|e| OpenError::invalid(e.to_string()))?,
        };

        let page_count = doc
            .page_count()
            .map_err(|e| OpenError::invalid(e.to_string()))?;
        let page_count = usize::try_from(page_count)
            .map_err(|_| OpenError::invalid("negative page count"))?;

        let title = doc
            .metadata(mupdf::MetadataName::Title)
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self {
            doc,
            page_count,
            title,
        })
    }
}

impl PageRenderer for MupdfRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage, RenderError> {
        let page = self
            .doc
            .load_page(index as i32)
            .map_err(|e| RenderError::engine(e.to_string()))?;

        let transform = Matrix::new_scale(scale, scale);
        let rgb = Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&transform, &rgb, true, false)
            .map_err(|e| RenderError::engine(e.to_string()))?;

        pixmap_to_rgba(&pixmap)
    }
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RasterImage, RenderError> {
    let n = pixmap.n() as usize;
    if n != 4 {
        return Err(RenderError::engine(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(RenderError::engine("Pixmap buffer size mismatch"));
    }

    let mut pixels = Vec::with_capacity(width * height * n);
    for y in 0..height {
        let row_start = y * stride;
        pixels.extend_from_slice(&samples[row_start..row_start + row_bytes]);
    }

    Ok(RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        pixels,
    })
}
