use std::fmt;

use serde::Serialize;

/// Pipeline stage at which a page was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStage {
    Text,
    Render,
    Recognize,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageStage::Text => "text",
            PageStage::Render => "render",
            PageStage::Recognize => "recognize",
        })
    }
}

/// A page that contributed no text because one of its stages failed.
///
/// These never change whether an extraction succeeds; they only explain a
/// smaller-than-expected aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDiagnostic {
    /// 1-based page number.
    pub page: usize,
    pub stage: PageStage,
    pub message: String,
}

impl fmt::Display for PageDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} ({}): {}", self.page, self.stage, self.message)
    }
}
