use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Matrix, Page, Pixmap, TextPageFlags};

use taxdraft_core::{BackendError, Document, PageSource, PdfBackend, RenderedPage};

/// Largest raster scale accepted; 4x a letter page is already ~8 megapixels.
pub const MAX_RENDER_SCALE: f32 = 4.0;

/// MuPDF-based implementation of [`PdfBackend`].
///
/// Only this crate links mupdf (AGPL-3.0); everything else sees the
/// [`PdfBackend`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn open(&self, document: &Document) -> Result<Box<dyn PageSource>, BackendError> {
        if document.is_empty() {
            return Err(BackendError::OpenError("file is empty".into()));
        }

        let doc = mupdf::Document::from_bytes(document.bytes(), "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        let count = doc
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = usize::try_from(count)
            .map_err(|_| BackendError::OpenError(format!("invalid page count {count}")))?;

        tracing::debug!(page_count, bytes = document.len(), "opened PDF with mupdf");
        Ok(Box::new(MupdfPages { doc, page_count }))
    }
}

struct MupdfPages {
    doc: mupdf::Document,
    page_count: usize,
}

impl MupdfPages {
    /// A page object that cannot be loaded means the page tree itself is
    /// broken, so this is reported as a container error; the render path
    /// downgrades it to a page error.
    fn load(&self, index: usize) -> Result<Page, BackendError> {
        let number = i32::try_from(index)
            .map_err(|_| BackendError::OpenError(format!("page index {index} out of range")))?;
        self.doc.load_page(number).map_err(|e| {
            BackendError::OpenError(format!("page {} could not be loaded: {}", index + 1, e))
        })
    }
}

impl PageSource for MupdfPages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page = self.load(index)?;
        let text_page =
            page.to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::PageError {
                    page: index + 1,
                    message: e.to_string(),
                })?;

        // Block/line iteration keeps MuPDF's reading order, one line per text line.
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<RenderedPage, BackendError> {
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_RENDER_SCALE {
            return Err(BackendError::RenderError {
                page: index + 1,
                message: format!("scale {scale} outside (0, {MAX_RENDER_SCALE}]"),
            });
        }

        // Unlike the text pass, rasterizing treats an unloadable page as
        // one lost image.
        let page = self.load(index).map_err(|e| BackendError::RenderError {
            page: index + 1,
            message: e.to_string(),
        })?;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(|e| BackendError::RenderError {
                page: index + 1,
                message: e.to_string(),
            })?;

        encode_png(&pixmap).map_err(|message| BackendError::RenderError {
            page: index + 1,
            message,
        })
    }
}

/// Copy an RGB pixmap into a PNG, dropping any row padding.
fn encode_png(pixmap: &Pixmap) -> Result<RenderedPage, String> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(format!("expected an RGB pixmap, got {n} components"));
    }

    let samples = pixmap.samples();
    let row_len = width as usize * n;
    let stride = if height == 0 {
        row_len
    } else {
        samples.len() / height as usize
    };
    if stride < row_len {
        return Err("pixmap sample buffer is shorter than its dimensions".into());
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in samples.chunks(stride).take(height as usize) {
        for px in row[..row_len].chunks_exact(n) {
            rgb.extend_from_slice(&px[..3]);
        }
    }

    let img = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| "failed to create image buffer".to_string())?;

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(RenderedPage { width, height, png })
}
