use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use taxdraft_core::{
    Document, EngineProvider, ExtractionFailure, ExtractionMethod, ExtractionResult,
    PageDiagnostic, PdfBackend,
};

use crate::config::{EscalationPolicy, ExtractionConfig};
use crate::structural::Pass;
use crate::{ocr, structural};

/// Everything known about one extraction call.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub result: ExtractionResult,
    /// `None` when the document could not be opened.
    pub page_count: Option<usize>,
    /// Strategies run, in order.
    pub attempted: Vec<ExtractionMethod>,
    /// Pages that contributed nothing because a stage failed.
    pub diagnostics: Vec<PageDiagnostic>,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Picks a strategy, runs it and classifies the outcome.
///
/// Holds no per-document state, so one extractor can serve any number of
/// calls, concurrently or in sequence.
pub struct Extractor {
    backend: Arc<dyn PdfBackend>,
    engines: Arc<dyn EngineProvider>,
    config: ExtractionConfig,
}

impl Extractor {
    /// Create an extractor with default configuration.
    pub fn new(backend: Arc<dyn PdfBackend>, engines: Arc<dyn EngineProvider>) -> Self {
        Self::with_config(backend, engines, ExtractionConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn PdfBackend>,
        engines: Arc<dyn EngineProvider>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            backend,
            engines,
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the text of `document`.
    ///
    /// With `force_ocr` the structural text layer is ignored and every page
    /// is recognized from its image. Otherwise only the text layer is read;
    /// whether a short result escalates to OCR in the same call depends on
    /// the configured [`EscalationPolicy`].
    pub fn extract(&self, document: &Document, force_ocr: bool) -> ExtractionResult {
        self.extract_report(document, force_ocr).result
    }

    /// Like [`extract`](Self::extract), also returning page diagnostics and
    /// timing.
    pub fn extract_report(&self, document: &Document, force_ocr: bool) -> ExtractionReport {
        let span = tracing::info_span!(
            "extract",
            backend = self.backend.name(),
            bytes = document.len(),
            force_ocr
        );
        let _guard = span.enter();
        let started = Instant::now();

        let mut diagnostics = Vec::new();
        let mut attempted = Vec::new();

        let (pass, method) = if force_ocr {
            attempted.push(ExtractionMethod::Ocr);
            (self.run_ocr(document, &mut diagnostics), ExtractionMethod::Ocr)
        } else {
            attempted.push(ExtractionMethod::Structural);
            let pass = structural::extract(
                self.backend.as_ref(),
                document,
                self.config.min_text_length,
                &mut diagnostics,
            );
            let escalate = self.config.escalation == EscalationPolicy::Automatic
                && pass
                    .outcome
                    .as_ref()
                    .is_err_and(ExtractionFailure::suggests_ocr);
            if escalate {
                tracing::info!(
                    structural_pages = pass.page_count,
                    "structural text unusable, escalating to OCR"
                );
                attempted.push(ExtractionMethod::Ocr);
                (self.run_ocr(document, &mut diagnostics), ExtractionMethod::Ocr)
            } else {
                (pass, ExtractionMethod::Structural)
            }
        };

        let result = match pass.outcome {
            Ok(text) => ExtractionResult::Success { text, method },
            Err(failure) => ExtractionResult::Failure(failure),
        };
        let elapsed = started.elapsed();

        match &result {
            ExtractionResult::Success { text, method } => tracing::info!(
                method = %method,
                chars = text.char_count(),
                pages = pass.page_count,
                skipped = diagnostics.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "extraction succeeded"
            ),
            ExtractionResult::Failure(failure) => tracing::warn!(
                kind = ?failure.kind(),
                detail = failure.detail(),
                pages = pass.page_count,
                skipped = diagnostics.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "extraction failed"
            ),
        }

        ExtractionReport {
            result,
            page_count: pass.page_count,
            attempted,
            diagnostics,
            elapsed,
        }
    }

    fn run_ocr(&self, document: &Document, diagnostics: &mut Vec<PageDiagnostic>) -> Pass {
        ocr::extract(
            self.backend.as_ref(),
            self.engines.as_ref(),
            document,
            self.config.min_text_length,
            self.config.ocr_scale,
            diagnostics,
        )
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}
