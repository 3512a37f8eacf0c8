//! The collaborators that turn extracted notice text into a reply.
//!
//! [`NoticeAssistant`] wraps two [`ChatBackend`]s: one for summarizing and
//! drafting, one for citation research, and runs either the full
//! summary/research/draft chain or a canned [`DraftTask`]. [`CitationAudit`]
//! checks that the draft only cites what research found, and [`export`]
//! packages the result as a Word document.

mod assistant;
mod chat;
pub mod citations;
pub mod export;
pub mod prompts;

pub use assistant::{NoticeAssistant, TaskOutput};
pub use chat::{
    AssistError, ChatBackend, ChatCompletions, ChatFuture, DEFAULT_DRAFTING_MODEL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESEARCH_MODEL, OPENAI_ENDPOINT, PERPLEXITY_ENDPOINT,
};
pub use citations::CitationAudit;
pub use export::{ExportError, docx_bytes, write_docx};
pub use prompts::DraftTask;
