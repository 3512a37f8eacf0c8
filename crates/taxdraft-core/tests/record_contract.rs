//! The flat `{success, text, method, error}` record that downstream tools read.

use taxdraft_core::{
    ExtractionFailure, ExtractionMethod, ExtractionRecord, ExtractionResult, FailureKind,
    UsableText,
};

fn every_failure() -> Vec<ExtractionFailure> {
    vec![
        ExtractionFailure::malformed("startxref not found"),
        ExtractionFailure::insufficient_content(7),
        ExtractionFailure::empty_content(),
        ExtractionFailure::ocr_unreadable(3),
        ExtractionFailure::engine_unavailable("tessdata missing"),
    ]
}

#[test]
fn failures_never_carry_text() {
    for failure in every_failure() {
        let kind = failure.kind();
        let record = ExtractionResult::from(failure).to_record();
        assert!(!record.success, "{kind:?}");
        assert!(record.text.is_none(), "{kind:?}");
        assert!(record.method.is_none(), "{kind:?}");
        assert!(!record.error.unwrap_or_default().is_empty(), "{kind:?}");
    }
}

#[test]
fn failure_messages_are_distinct() {
    let messages: Vec<String> = every_failure().iter().map(ToString::to_string).collect();
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn only_content_failures_point_at_ocr() {
    let suggesting: Vec<FailureKind> = every_failure()
        .into_iter()
        .filter(ExtractionFailure::suggests_ocr)
        .map(|f| f.kind())
        .collect();
    assert_eq!(
        suggesting,
        vec![FailureKind::InsufficientContent, FailureKind::EmptyContent]
    );
}

#[test]
fn record_reads_back_from_json() {
    let result = ExtractionResult::Success {
        text: UsableText::new(&"GSTIN 27AAAAA0000A1Z5 ".repeat(4), 50).unwrap(),
        method: ExtractionMethod::Ocr,
    };
    let json = serde_json::to_string(&result).unwrap();
    let record: ExtractionRecord = serde_json::from_str(&json).unwrap();

    assert!(record.success);
    assert_eq!(record.method, Some(ExtractionMethod::Ocr));
    assert!(record.error.is_none());
    assert_eq!(record.text.as_deref(), result.text());
}
