//! OCR engine construction.
//!
//! The recognizer is expensive to load (language models are read from disk),
//! so callers go through a [`LazyEngine`]: built on the first OCR request,
//! reused for the rest of the process, rebuilt on the next request if
//! loading failed.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use taxdraft_core::{EngineError, LazyEngine, Recognizer};

#[cfg(feature = "tesseract")]
mod tesseract;

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

/// Settings used to construct the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    /// Tesseract language code(s), e.g. `eng` or `eng+hin`.
    pub language: String,
    /// Directory holding `*.traineddata`. `None` uses `TESSDATA_PREFIX` or
    /// the system default.
    pub tessdata_path: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            tessdata_path: None,
        }
    }
}

/// Construct a recognizer now.
pub fn build_engine(settings: &OcrSettings) -> Result<Arc<dyn Recognizer>, EngineError> {
    #[cfg(feature = "tesseract")]
    {
        let recognizer = TesseractRecognizer::new(settings.clone())?;
        Ok(Arc::new(recognizer))
    }

    #[cfg(not(feature = "tesseract"))]
    {
        tracing::debug!(language = %settings.language, "OCR requested without tesseract support");
        Err(EngineError::NotCompiled(
            "rebuild with the `tesseract` feature of taxdraft-ocr".into(),
        ))
    }
}

/// A recognizer that is built on first use.
pub fn lazy_engine(settings: OcrSettings) -> LazyEngine {
    LazyEngine::new(move || build_engine(&settings))
}

static SHARED: OnceCell<(OcrSettings, Arc<LazyEngine>)> = OnceCell::new();

/// The process-wide engine handle.
///
/// The settings passed by the first caller are the ones used; later callers
/// asking for different settings get the existing engine and a warning.
pub fn shared_engine(settings: &OcrSettings) -> Arc<LazyEngine> {
    let (existing, engine) =
        SHARED.get_or_init(|| (settings.clone(), Arc::new(lazy_engine(settings.clone()))));
    if existing != settings {
        tracing::warn!(
            requested = %settings.language,
            active = %existing.language,
            "shared OCR engine already configured; ignoring new settings"
        );
    }
    Arc::clone(engine)
}

/// Split raw recognizer output into ordered, non-blank line fragments.
pub fn text_fragments(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
