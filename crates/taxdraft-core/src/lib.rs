use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod diagnostics;
pub mod document;
pub mod engine;

pub use backend::{BackendError, PageSource, PdfBackend, RenderedPage};
pub use diagnostics::{PageDiagnostic, PageStage};
pub use document::Document;
pub use engine::{EngineError, EngineProvider, LazyEngine, RecognitionError, Recognizer};

/// Minimum trimmed character count for extracted text to be usable.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 50;

/// Which strategy produced the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Text read from the document's content streams.
    Structural,
    /// Text recognized from rendered page images.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Structural => "structural",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trimmed text that has passed the minimum-length check.
///
/// The only way to obtain one is [`UsableText::new`], so a successful
/// [`ExtractionResult`] can never carry short or empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsableText(String);

impl UsableText {
    /// Trim `raw` and accept it if it holds at least `min_len` characters.
    ///
    /// On rejection returns the trimmed character count, which is zero for
    /// whitespace-only input.
    pub fn new(raw: &str, min_len: usize) -> Result<Self, usize> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();
        if chars >= min_len && chars > 0 {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(chars)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for UsableText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// Category of an extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The bytes are not a parseable document container.
    Malformed,
    /// Structural text was found but fell below the usable threshold.
    InsufficientContent,
    /// Structural parsing succeeded with no text at all.
    EmptyContent,
    /// OCR ran but did not recover enough text.
    OcrUnreadable,
    /// The OCR engine could not be initialized.
    EngineUnavailable,
}

/// A failed extraction with a human-actionable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    kind: FailureKind,
    detail: Option<String>,
}

impl ExtractionFailure {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Malformed,
            detail: Some(detail.into()),
        }
    }

    /// `chars` is the trimmed character count that was found.
    pub fn insufficient_content(chars: usize) -> Self {
        Self {
            kind: FailureKind::InsufficientContent,
            detail: Some(format!("{chars} characters extracted")),
        }
    }

    pub fn empty_content() -> Self {
        Self {
            kind: FailureKind::EmptyContent,
            detail: None,
        }
    }

    pub fn ocr_unreadable(chars: usize) -> Self {
        Self {
            kind: FailureKind::OcrUnreadable,
            detail: Some(format!("{chars} characters recognized")),
        }
    }

    pub fn engine_unavailable(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::EngineUnavailable,
            detail: Some(detail.into()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Whether retrying the same file can help (after enabling OCR or
    /// fixing the environment).
    pub fn retryable(&self) -> bool {
        !matches!(self.kind, FailureKind::Malformed | FailureKind::OcrUnreadable)
    }

    /// Whether the caller should retry with OCR forced on.
    pub fn suggests_ocr(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::InsufficientContent | FailureKind::EmptyContent
        )
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Malformed => write!(
                f,
                "Could not read the PDF file: {}. Check that the file is a valid, uncorrupted PDF.",
                self.detail.as_deref().unwrap_or("unknown parse error")
            ),
            FailureKind::InsufficientContent => f.write_str(
                "Very little text was extracted; this is likely a scanned document. \
                 Retry with OCR enabled to read the page images.",
            ),
            FailureKind::EmptyContent => f.write_str(
                "No text could be extracted using standard methods. If this is a scanned \
                 document, retry with OCR enabled; otherwise the file may be empty or \
                 corrupted, so verify it.",
            ),
            FailureKind::OcrUnreadable => f.write_str(
                "The document appears to be empty or unreadable even with OCR. Verify the \
                 file is not corrupted and contains readable content, or try a different file.",
            ),
            FailureKind::EngineUnavailable => write!(
                f,
                "The OCR engine is unavailable ({}). This is an environment problem, not a \
                 problem with the document: install or configure the OCR engine and retry.",
                self.detail.as_deref().unwrap_or("initialization failed")
            ),
        }
    }
}

impl std::error::Error for ExtractionFailure {}

/// The normalized outcome of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ExtractionRecord")]
pub enum ExtractionResult {
    Success {
        text: UsableText,
        method: ExtractionMethod,
    },
    Failure(ExtractionFailure),
}

impl ExtractionResult {
    pub fn success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success { text, .. } => Some(text.as_str()),
            ExtractionResult::Failure(_) => None,
        }
    }

    pub fn method(&self) -> Option<ExtractionMethod> {
        match self {
            ExtractionResult::Success { method, .. } => Some(*method),
            ExtractionResult::Failure(_) => None,
        }
    }

    /// The human-readable diagnostic, present iff the extraction failed.
    pub fn error(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }

    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            ExtractionResult::Success { .. } => None,
            ExtractionResult::Failure(failure) => Some(failure),
        }
    }

    /// Flatten into the `{success, text, method, error}` record.
    pub fn to_record(&self) -> ExtractionRecord {
        ExtractionRecord::from(self.clone())
    }
}

impl From<ExtractionFailure> for ExtractionResult {
    fn from(failure: ExtractionFailure) -> Self {
        ExtractionResult::Failure(failure)
    }
}

/// Flat view of an [`ExtractionResult`], as handed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub success: bool,
    pub text: Option<String>,
    pub method: Option<ExtractionMethod>,
    pub error: Option<String>,
}

impl From<ExtractionResult> for ExtractionRecord {
    fn from(result: ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success { text, method } => ExtractionRecord {
                success: true,
                text: Some(text.into_string()),
                method: Some(method),
                error: None,
            },
            ExtractionResult::Failure(failure) => ExtractionRecord {
                success: false,
                text: None,
                method: None,
                error: Some(failure.to_string()),
            },
        }
    }
}
