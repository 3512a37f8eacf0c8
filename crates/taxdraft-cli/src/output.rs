use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use taxdraft_assist::CitationAudit;
use taxdraft_extract::{ExtractionReport, ExtractionResult};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// A steady-ticking spinner on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// One-line outcome of an extraction, plus any skipped pages.
pub fn print_extraction_status(
    w: &mut dyn Write,
    report: &ExtractionReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let pages = report
        .page_count
        .map(|n| format!("{n} page{}", if n == 1 { "" } else { "s" }))
        .unwrap_or_else(|| "unreadable document".to_string());

    match &report.result {
        ExtractionResult::Success { text, method } => {
            let line = format!(
                "Extracted {} characters from {} ({}) in {:.1?}",
                text.char_count(),
                pages,
                method,
                report.elapsed
            );
            if color.enabled() {
                writeln!(w, "{}", line.green())?;
            } else {
                writeln!(w, "{line}")?;
            }
        }
        ExtractionResult::Failure(failure) => {
            if color.enabled() {
                writeln!(w, "{} {}", "Extraction failed:".red().bold(), failure)?;
            } else {
                writeln!(w, "Extraction failed: {failure}")?;
            }
            if failure.suggests_ocr() {
                let hint = "Hint: rerun with --force-ocr (or --auto-ocr) to read the page images.";
                if color.enabled() {
                    writeln!(w, "{}", hint.yellow())?;
                } else {
                    writeln!(w, "{hint}")?;
                }
            }
        }
    }

    for diagnostic in &report.diagnostics {
        let line = format!("  skipped {diagnostic}");
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

/// A titled block of model output.
pub fn print_section(
    w: &mut dyn Write,
    title: &str,
    body: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", title.bold().underline())?;
    } else {
        writeln!(w, "{title}")?;
        writeln!(w, "{}", "=".repeat(title.chars().count()))?;
    }
    writeln!(w, "{}", body.trim_end())?;
    writeln!(w)?;
    Ok(())
}

/// Warnings from the citation cross-check.
pub fn print_citation_audit(
    w: &mut dyn Write,
    audit: &CitationAudit,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Citations: {} in research note, {} in draft",
        audit.research_urls.len(),
        audit.draft_urls.len()
    )?;

    for url in &audit.unsupported_urls {
        let line = format!("  not in research note: {url}");
        if color.enabled() {
            writeln!(w, "{}", line.red())?;
        } else {
            writeln!(w, "{line}")?;
        }
    }

    if audit.research_gaps > 0 || audit.unsupported_points > 0 {
        let line = format!(
            "  {} research point(s) without a verified reference; \
             {} draft point(s) marked unsupported",
            audit.research_gaps, audit.unsupported_points
        );
        if color.enabled() {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{line}")?;
        }
    }

    if audit.is_clean() {
        let line = "  every cited URL comes from the research note";
        if color.enabled() {
            writeln!(w, "{}", line.green())?;
        } else {
            writeln!(w, "{line}")?;
        }
    }
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use taxdraft_extract::{
        ExtractionFailure, ExtractionMethod, PageDiagnostic, PageStage, UsableText,
    };

    use super::*;

    fn render(report: &ExtractionReport) -> String {
        let mut out = Vec::new();
        print_extraction_status(&mut out, report, ColorMode(false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn success_status_names_method_and_skips() {
        let report = ExtractionReport {
            result: ExtractionResult::Success {
                text: UsableText::new(&"a".repeat(120), 50).unwrap(),
                method: ExtractionMethod::Ocr,
            },
            page_count: Some(3),
            attempted: vec![ExtractionMethod::Ocr],
            diagnostics: vec![PageDiagnostic {
                page: 2,
                stage: PageStage::Recognize,
                message: "engine crashed".into(),
            }],
            elapsed: Duration::from_millis(1500),
        };
        let text = render(&report);
        assert!(text.starts_with("Extracted 120 characters from 3 pages (ocr)"));
        assert!(text.contains("skipped page 2 (recognize): engine crashed"));
    }

    #[test]
    fn short_text_failure_suggests_ocr() {
        let report = ExtractionReport {
            result: ExtractionFailure::insufficient_content(12).into(),
            page_count: Some(1),
            attempted: vec![ExtractionMethod::Structural],
            diagnostics: Vec::new(),
            elapsed: Duration::ZERO,
        };
        let text = render(&report);
        assert!(text.starts_with("Extraction failed: Very little text"));
        assert!(text.contains("--force-ocr"));
    }

    #[test]
    fn malformed_failure_has_no_ocr_hint() {
        let report = ExtractionReport {
            result: ExtractionFailure::malformed("no objects found").into(),
            page_count: None,
            attempted: vec![ExtractionMethod::Structural],
            diagnostics: Vec::new(),
            elapsed: Duration::ZERO,
        };
        assert!(!render(&report).contains("--force-ocr"));
    }

    #[test]
    fn audit_lists_unsupported_urls() {
        let audit = CitationAudit::audit(
            "https://a.example/1",
            "https://a.example/1 https://b.example/2",
        );
        let mut out = Vec::new();
        print_citation_audit(&mut out, &audit, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 in research note, 2 in draft"));
        assert!(text.contains("not in research note: https://b.example/2"));
        assert!(!text.contains("every cited URL"));
    }
}
