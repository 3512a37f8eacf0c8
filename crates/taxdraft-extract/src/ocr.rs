use taxdraft_core::{
    Document, EngineProvider, ExtractionFailure, PageDiagnostic, PageStage, PdfBackend,
    RecognitionError, UsableText,
};

use crate::structural::{Pass, container_detail};

/// Rasterize every page, recognize it and classify the aggregate.
///
/// The container is opened before the engine is requested, so input that
/// is not a PDF never costs a model load. Render and recognition failures
/// lose only their page; an engine that disappears mid-run ends the run as
/// unavailable.
pub(crate) fn extract(
    backend: &dyn PdfBackend,
    engines: &dyn EngineProvider,
    document: &Document,
    min_text_length: usize,
    scale: f32,
    diagnostics: &mut Vec<PageDiagnostic>,
) -> Pass {
    let pages = match backend.open(document) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(
                backend = backend.name(),
                error = %e,
                "document could not be opened for OCR"
            );
            return Pass::failed(ExtractionFailure::malformed(format!(
                "OCR could not open the document: {}",
                container_detail(&e)
            )));
        }
    };
    let page_count = pages.page_count();

    let recognizer = match engines.engine() {
        Ok(recognizer) => recognizer,
        Err(e) => {
            return Pass {
                outcome: Err(ExtractionFailure::engine_unavailable(e.to_string())),
                page_count: Some(page_count),
            };
        }
    };

    let mut text = String::new();
    for index in 0..page_count {
        let page = index + 1;
        // Once the container is open, any page that will not rasterize costs
        // only itself.
        let image = match pages.render_page(index, scale) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping page that failed to render");
                diagnostics.push(PageDiagnostic {
                    page,
                    stage: PageStage::Render,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match recognizer.recognize(&image) {
            Ok(fragments) => {
                tracing::trace!(page, fragments = fragments.len(), "page recognized");
                let page_text = fragments.join("\n");
                if !page_text.trim().is_empty() {
                    text.push_str(&page_text);
                    text.push('\n');
                }
            }
            Err(RecognitionError::EngineLost(e)) => {
                tracing::warn!(
                    page,
                    engine = recognizer.name(),
                    error = %e,
                    "OCR engine lost mid-document"
                );
                return Pass {
                    outcome: Err(ExtractionFailure::engine_unavailable(e.to_string())),
                    page_count: Some(page_count),
                };
            }
            Err(e) => {
                tracing::warn!(
                    page,
                    engine = recognizer.name(),
                    error = %e,
                    "skipping page that failed recognition"
                );
                diagnostics.push(PageDiagnostic {
                    page,
                    stage: PageStage::Recognize,
                    message: e.to_string(),
                });
            }
        }
    }

    let outcome = UsableText::new(&text, min_text_length).map_err(|chars| {
        tracing::debug!(chars, min_text_length, "recognized text below threshold");
        ExtractionFailure::ocr_unreadable(chars)
    });

    Pass {
        outcome,
        page_count: Some(page_count),
    }
}
