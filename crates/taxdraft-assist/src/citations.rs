//! Cross-check of the URLs a draft cites against the research note it was
//! written from.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::prompts::{NO_VERIFIED_REFERENCE_AVAILABLE, NO_VERIFIED_REFERENCE_FOUND};

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s<>()\[\]{}"'`|]+"#).unwrap());

/// URLs in `text`, in first-seen order, without duplicates or trailing
/// sentence punctuation.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in URL_RE.find_iter(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '*']);
        if !urls.iter().any(|u| same_url(u, url)) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Scheme and host are case-insensitive; a trailing slash is ignored.
fn same_url(a: &str, b: &str) -> bool {
    fn split(url: &str) -> (String, &str) {
        let url = url.trim_end_matches('/');
        let host_end = url
            .find("://")
            .map(|i| i + 3)
            .and_then(|start| url[start..].find('/').map(|j| start + j))
            .unwrap_or(url.len());
        (url[..host_end].to_ascii_lowercase(), &url[host_end..])
    }
    split(a) == split(b)
}

/// Result of comparing a draft's citations with its research note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationAudit {
    pub research_urls: Vec<String>,
    pub draft_urls: Vec<String>,
    /// Draft URLs that never appeared in the research note.
    pub unsupported_urls: Vec<String>,
    /// Points the research note could not source.
    pub research_gaps: usize,
    /// Points the draft states without a citation.
    pub unsupported_points: usize,
}

impl CitationAudit {
    pub fn audit(research_note: &str, draft: &str) -> Self {
        let research_urls = extract_urls(research_note);
        let draft_urls = extract_urls(draft);
        let unsupported_urls = draft_urls
            .iter()
            .filter(|url| !research_urls.iter().any(|r| same_url(r, url)))
            .cloned()
            .collect::<Vec<_>>();

        if !unsupported_urls.is_empty() {
            tracing::warn!(
                count = unsupported_urls.len(),
                "draft cites URLs absent from the research note"
            );
        }

        Self {
            research_gaps: research_note.matches(NO_VERIFIED_REFERENCE_FOUND).count(),
            unsupported_points: draft.matches(NO_VERIFIED_REFERENCE_AVAILABLE).count(),
            research_urls,
            draft_urls,
            unsupported_urls,
        }
    }

    /// Every URL in the draft came from the research note.
    pub fn is_clean(&self) -> bool {
        self.unsupported_urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_markdown_and_bare_urls() {
        let note = "1. [Safari Retreats](https://indiankanoon.org/doc/12345/) (2019).\n\
                    2. See https://cbic-gst.gov.in/circular-170.pdf, para 4.\n\
                    3. Again https://indiankanoon.org/doc/12345";
        assert_eq!(
            extract_urls(note),
            vec![
                "https://indiankanoon.org/doc/12345/".to_string(),
                "https://cbic-gst.gov.in/circular-170.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn no_urls() {
        assert!(extract_urls("No verified reference found").is_empty());
    }

    #[test]
    fn flags_invented_citations() {
        let note = "Limitation: https://indiankanoon.org/doc/1/\nITC: No verified reference found";
        let draft = "Para 3 relies on HTTPS://IndianKanoon.org/doc/1 and \
                     https://made-up.example/case-9. Para 4: No verified reference available.";

        let audit = CitationAudit::audit(note, draft);

        assert_eq!(audit.unsupported_urls, vec!["https://made-up.example/case-9".to_string()]);
        assert_eq!(audit.research_gaps, 1);
        assert_eq!(audit.unsupported_points, 1);
        assert!(!audit.is_clean());
    }

    #[test]
    fn path_case_matters() {
        assert!(!same_url("https://a.in/Doc", "https://a.in/doc"));
        assert!(same_url("HTTP://A.IN/doc/", "http://a.in/doc"));
    }

    #[test]
    fn clean_draft() {
        let note = "https://gstcouncil.gov.in/minutes";
        let audit = CitationAudit::audit(note, "As held at https://gstcouncil.gov.in/minutes.");
        assert!(audit.is_clean());
        assert_eq!(audit.draft_urls.len(), 1);
    }
}
