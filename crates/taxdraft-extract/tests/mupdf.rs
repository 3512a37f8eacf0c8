//! End to end through MuPDF and the shared OCR engine.

#![cfg(feature = "mupdf")]

mod common;

use common::minimal_pdf;
use taxdraft_extract::{Document, ExtractionMethod, FailureKind, extract_pdf};

#[test]
fn digital_notice_is_read_structurally() {
    let document = minimal_pdf(&[
        "OFFICE OF THE ASSISTANT COMMISSIONER\nSHOW CAUSE NOTICE",
        "Whereas the taxpayer failed to file returns for 2019-20.",
    ]);

    let result = extract_pdf(&document, false);

    assert_eq!(result.method(), Some(ExtractionMethod::Structural));
    let text = result.text().unwrap();
    assert!(text.starts_with("OFFICE OF THE ASSISTANT COMMISSIONER"));
    assert!(text.contains("SHOW CAUSE NOTICE"));
    assert!(text.ends_with("2019-20."));
}

#[test]
fn imageless_short_page_asks_for_ocr() {
    let result = extract_pdf(&minimal_pdf(&["Page 1 of 1"]), false);
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::InsufficientContent);
    assert!(failure.suggests_ocr());
}

#[test]
fn garbage_is_malformed() {
    let result = extract_pdf(&Document::from_bytes(b"%PDF-1.4 truncated".to_vec()), false);
    assert_eq!(result.failure().unwrap().kind(), FailureKind::Malformed);
}

#[cfg(not(feature = "tesseract"))]
#[test]
fn ocr_without_engine_is_an_environment_problem() {
    let result = extract_pdf(&minimal_pdf(&["scanned"]), true);
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::EngineUnavailable);
    assert!(failure.retryable());
}
