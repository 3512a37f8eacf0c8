use thiserror::Error;

use crate::Document;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to read text of page {page}: {message}")]
    PageError { page: usize, message: String },
    #[error("failed to render page {page}: {message}")]
    RenderError { page: usize, message: String },
}

impl BackendError {
    /// Whether the error is confined to one page, leaving the rest of the
    /// document readable.
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            BackendError::PageError { .. } | BackendError::RenderError { .. }
        )
    }
}

/// A page rasterized for recognition, encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// An opened document whose pages can be projected to text or pixels.
///
/// Page indices are 0-based; diagnostics report them 1-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// The structural text layer of a page. Empty when the page has none.
    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Rasterize a page at `scale` times its natural size.
    fn render_page(&self, index: usize, scale: f32) -> Result<RenderedPage, BackendError>;
}

/// Trait for PDF parsing backends.
///
/// Implementors open the container and expose its pages; strategy
/// selection and outcome classification live in `taxdraft_extract`.
pub trait PdfBackend: Send + Sync {
    /// Backend name for logs (e.g. "mupdf").
    fn name(&self) -> &str;

    /// Open `document`, failing with [`BackendError::OpenError`] when the
    /// bytes are not a readable PDF.
    fn open(&self, document: &Document) -> Result<Box<dyn PageSource>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_page_errors_are_local() {
        assert!(!BackendError::OpenError("startxref not found".into()).is_page_local());
        assert!(
            BackendError::PageError {
                page: 2,
                message: "bad font".into()
            }
            .is_page_local()
        );
        assert!(
            BackendError::RenderError {
                page: 3,
                message: "out of memory".into()
            }
            .is_page_local()
        );
    }
}
