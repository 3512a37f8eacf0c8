use std::sync::{Mutex, PoisonError};

use tesseract::Tesseract;

use taxdraft_core::{EngineError, RecognitionError, Recognizer, RenderedPage};

use crate::{OcrSettings, text_fragments};

/// Tesseract-backed [`Recognizer`].
///
/// The tesseract API consumes its handle on every step, so the handle lives
/// in a slot that is taken for the duration of a page and put back when the
/// page succeeds. A page that fails loses the handle; the next page loads a
/// fresh one, and if that load fails the engine is reported lost rather
/// than the page unreadable.
pub struct TesseractRecognizer {
    settings: OcrSettings,
    api: Mutex<Option<Tesseract>>,
}

impl TesseractRecognizer {
    pub fn new(settings: OcrSettings) -> Result<Self, EngineError> {
        let api = init(&settings)?;
        Ok(Self {
            settings,
            api: Mutex::new(Some(api)),
        })
    }
}

fn init(settings: &OcrSettings) -> Result<Tesseract, EngineError> {
    Tesseract::new(settings.tessdata_path.as_deref(), Some(&settings.language)).map_err(|e| {
        EngineError::Initialization(format!(
            "tesseract could not load language '{}': {}",
            settings.language, e
        ))
    })
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, page: &RenderedPage) -> Result<Vec<String>, RecognitionError> {
        // A poisoned slot at worst holds no handle, which the reload covers.
        let mut slot = self.api.lock().unwrap_or_else(PoisonError::into_inner);

        let api = match slot.take() {
            Some(api) => api,
            None => {
                tracing::debug!("reloading tesseract after a failed page");
                init(&self.settings)?
            }
        };

        let mut api = api
            .set_image_from_mem(&page.png)
            .map_err(|e| RecognitionError::Page(format!("could not load page image: {e}")))?
            .recognize()
            .map_err(|e| RecognitionError::Page(e.to_string()))?;
        let text = api.get_text();
        *slot = Some(api);

        let text = text.map_err(|e| RecognitionError::Page(e.to_string()))?;
        Ok(text_fragments(&text))
    }
}
