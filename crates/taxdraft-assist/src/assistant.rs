use std::sync::Arc;

use crate::chat::{AssistError, ChatBackend};
use crate::prompts::{self, DraftTask};

/// What a canned [`DraftTask`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    /// The research model's answer, for tasks with a research step.
    pub research_note: Option<String>,
    pub draft: String,
}

/// Summarizes notices, researches support and drafts documents.
///
/// Summary and drafting go to `drafting`; research goes to `research`,
/// which is expected to be a search-grounded model.
#[derive(Clone)]
pub struct NoticeAssistant {
    drafting: Arc<dyn ChatBackend>,
    research: Arc<dyn ChatBackend>,
}

impl NoticeAssistant {
    pub fn new(drafting: Arc<dyn ChatBackend>, research: Arc<dyn ChatBackend>) -> Self {
        Self { drafting, research }
    }

    /// Structured summary of extracted notice text.
    pub async fn summarize_notice(&self, notice_text: &str) -> Result<String, AssistError> {
        if notice_text.trim().is_empty() {
            return Err(AssistError::EmptyInput("summarize"));
        }
        let summary = self
            .drafting
            .complete(&prompts::summary_prompt(notice_text))
            .await?;
        tracing::info!(
            backend = self.drafting.name(),
            chars = summary.chars().count(),
            "notice summarized"
        );
        Ok(summary)
    }

    /// Research note with provisions and precedents, each with a URL or an
    /// explicit "no verified reference" marker.
    pub async fn research_support(
        &self,
        instructions: &str,
        notice_summary: &str,
    ) -> Result<String, AssistError> {
        if notice_summary.trim().is_empty() {
            return Err(AssistError::EmptyInput("research"));
        }
        let task = prompts::research_prompt(instructions, notice_summary);
        let note = self
            .research
            .complete(&prompts::research_rules(&task))
            .await?;
        tracing::info!(
            backend = self.research.name(),
            chars = note.chars().count(),
            "research note received"
        );
        Ok(note)
    }

    /// Final document citing only what the research note contains.
    pub async fn draft_document(
        &self,
        instructions: &str,
        notice_summary: &str,
        research_note: &str,
    ) -> Result<String, AssistError> {
        if instructions.trim().is_empty() {
            return Err(AssistError::EmptyInput("draft"));
        }
        let draft = self
            .drafting
            .complete(&prompts::drafting_prompt(
                instructions,
                notice_summary,
                research_note,
            ))
            .await?;
        tracing::info!(
            backend = self.drafting.name(),
            chars = draft.chars().count(),
            "document drafted"
        );
        Ok(draft)
    }

    /// Run a canned task over `details` (notice text and any facts the
    /// caller adds).
    pub async fn run_task(
        &self,
        task: DraftTask,
        details: &str,
    ) -> Result<TaskOutput, AssistError> {
        if details.trim().is_empty() {
            return Err(AssistError::EmptyInput("task"));
        }

        let research_note = match task.research_prompt(details) {
            Some(prompt) => {
                let note = self
                    .research
                    .complete(&prompts::research_rules(&prompt))
                    .await?;
                tracing::info!(
                    task = %task,
                    backend = self.research.name(),
                    chars = note.chars().count(),
                    "task research received"
                );
                Some(note)
            }
            None => None,
        };

        let draft = self
            .drafting
            .complete(&task.drafting_prompt(details, research_note.as_deref()))
            .await?;
        tracing::info!(
            task = %task,
            backend = self.drafting.name(),
            chars = draft.chars().count(),
            "task drafted"
        );
        Ok(TaskOutput {
            research_note,
            draft,
        })
    }
}

impl std::fmt::Debug for NoticeAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeAssistant")
            .field("drafting", &self.drafting.name())
            .field("research", &self.research.name())
            .finish()
    }
}
