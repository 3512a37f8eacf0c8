//! Text extraction for tax-notice PDFs.
//!
//! Two strategies share one outcome contract:
//!
//! - **structural**: read the document's text layer page by page.
//! - **OCR**: render each page and run a recognition engine over the image.
//!
//! [`Extractor`] picks the strategy, runs it, and turns whatever came back
//! into an [`ExtractionResult`]: usable text (at least
//! [`ExtractionConfig::min_text_length`] characters after trimming) tagged
//! with the strategy that produced it, or a failure explaining what to do
//! next. Extraction never panics or returns `Err`; every problem is folded
//! into the result.
//!
//! With the default `mupdf` feature, [`default_extractor`] and
//! [`extract_pdf`] wire in MuPDF and the process-wide OCR engine.

mod config;
mod coordinator;
mod ocr;
mod structural;

pub use config::{
    ConfigError, DEFAULT_OCR_SCALE, EscalationPolicy, ExtractionConfig, ExtractionConfigBuilder,
    MAX_OCR_SCALE,
};
pub use coordinator::{ExtractionReport, Extractor};
pub use taxdraft_core::{
    Document, ExtractionFailure, ExtractionMethod, ExtractionRecord, ExtractionResult,
    FailureKind, PageDiagnostic, PageStage, UsableText,
};
pub use taxdraft_ocr::OcrSettings;

#[cfg(feature = "mupdf")]
use std::sync::Arc;

/// An extractor over MuPDF and the shared OCR engine.
#[cfg(feature = "mupdf")]
pub fn default_extractor(config: ExtractionConfig, ocr: &OcrSettings) -> Extractor {
    Extractor::with_config(
        Arc::new(taxdraft_pdf_mupdf::MupdfBackend::new()),
        taxdraft_ocr::shared_engine(ocr),
        config,
    )
}

/// Extract with default settings.
#[cfg(feature = "mupdf")]
pub fn extract_pdf(document: &Document, force_ocr: bool) -> ExtractionResult {
    default_extractor(ExtractionConfig::default(), &OcrSettings::default())
        .extract(document, force_ocr)
}
