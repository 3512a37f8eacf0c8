use taxdraft_core::{
    BackendError, Document, ExtractionFailure, PageDiagnostic, PageStage, PdfBackend, UsableText,
};

/// What one strategy produced, before the coordinator wraps it.
pub(crate) struct Pass {
    pub(crate) outcome: Result<UsableText, ExtractionFailure>,
    pub(crate) page_count: Option<usize>,
}

impl Pass {
    pub(crate) fn failed(failure: ExtractionFailure) -> Self {
        Self {
            outcome: Err(failure),
            page_count: None,
        }
    }
}

/// The message inside a container error, without the error's own prefix.
pub(crate) fn container_detail(err: &BackendError) -> String {
    match err {
        BackendError::OpenError(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Read the text layer of every page and classify the aggregate.
///
/// Pages whose text layer is blank contribute nothing. A page whose text
/// layer cannot be decoded is recorded in `diagnostics` and skipped.
pub(crate) fn extract(
    backend: &dyn PdfBackend,
    document: &Document,
    min_text_length: usize,
    diagnostics: &mut Vec<PageDiagnostic>,
) -> Pass {
    let pages = match backend.open(document) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "document could not be opened");
            return Pass::failed(ExtractionFailure::malformed(container_detail(&e)));
        }
    };
    let page_count = pages.page_count();

    let mut text = String::new();
    for index in 0..page_count {
        match pages.page_text(index) {
            Ok(page_text) if page_text.trim().is_empty() => {}
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) if e.is_page_local() => {
                tracing::warn!(
                    page = index + 1,
                    error = %e,
                    "skipping page with unreadable text layer"
                );
                diagnostics.push(PageDiagnostic {
                    page: index + 1,
                    stage: PageStage::Text,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(page = index + 1, error = %e, "page tree is broken");
                return Pass {
                    outcome: Err(ExtractionFailure::malformed(container_detail(&e))),
                    page_count: Some(page_count),
                };
            }
        }
    }

    let outcome = UsableText::new(&text, min_text_length).map_err(|chars| {
        tracing::debug!(chars, min_text_length, "structural text below threshold");
        if chars == 0 {
            ExtractionFailure::empty_content()
        } else {
            ExtractionFailure::insufficient_content(chars)
        }
    });

    Pass {
        outcome,
        page_count: Some(page_count),
    }
}
