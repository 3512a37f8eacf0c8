//! Prompt templates for the three collaborator calls and the canned
//! drafting tasks.

use std::fmt;
use std::str::FromStr;

/// Printed by the research model for any point it cannot back with a
/// verifiable source.
pub const NO_VERIFIED_REFERENCE_FOUND: &str = "No verified reference found";

/// Printed by the drafting model for any legal point left without a
/// supporting citation.
pub const NO_VERIFIED_REFERENCE_AVAILABLE: &str = "No verified reference available";

pub fn summary_prompt(notice_text: &str) -> String {
    format!(
        "You are a GST legal assistant.\n\
         \n\
         Summarise the GST notice below in a clear, structured form. Extract:\n\
         - Main allegations\n\
         - Period involved\n\
         - Sections / provisions invoked (where visible)\n\
         - Basis of demand (facts and law)\n\
         - Evidence relied upon\n\
         - Any procedural lapses\n\
         \n\
         Do NOT draft a reply. Only summarise.\n\
         \n\
         Notice text:\n\
         {notice_text}\n"
    )
}

pub fn research_prompt(instructions: &str, notice_summary: &str) -> String {
    format!(
        "The user wants to carry out the following legal task in a GST matter.\n\
         \n\
         User instructions:\n\
         {instructions}\n\
         \n\
         Summary of the GST notice:\n\
         {notice_summary}\n\
         \n\
         Using Indian GST law and case law:\n\
         - Identify the relevant statutory provisions.\n\
         - Identify as many supporting case laws as possible.\n\
         - For each case law give: case name, court / forum, year, one-line relevance, exact URL.\n\
         \n\
         RULES:\n\
         - Do NOT hallucinate.\n\
         - Where no verified case law exists for a point, say \"{NO_VERIFIED_REFERENCE_FOUND}\".\n\
         \n\
         Return a structured research note with headings and bullet points.\n"
    )
}

/// Wrap a research task in the standing rules sent to the research model.
pub fn research_rules(task: &str) -> String {
    format!(
        "You are a GST legal research assistant.\n\
         \n\
         RULES:\n\
         - Do NOT hallucinate.\n\
         - Only cite case laws or references you can verify.\n\
         - Give the exact URL for every case law or reference.\n\
         - If you are unsure, say \"{NO_VERIFIED_REFERENCE_FOUND}\".\n\
         \n\
         Task:\n\
         {task}"
    )
}

pub fn drafting_prompt(instructions: &str, notice_summary: &str, research_note: &str) -> String {
    format!(
        "You are a GST legal drafting assistant.\n\
         \n\
         TASK:\n\
         Draft a complete legal document from the user's instructions, the GST notice \
         summary and the research note (case laws with URLs).\n\
         \n\
         User instructions:\n\
         {instructions}\n\
         \n\
         GST notice summary:\n\
         {notice_summary}\n\
         \n\
         Research note (case laws and URLs):\n\
         {research_note}\n\
         \n\
         RULES:\n\
         - Do NOT hallucinate.\n\
         - Do NOT invent case laws or URLs.\n\
         - Rely ONLY on case laws and URLs that appear in the research note.\n\
         - For any legal point without a supporting case law, \
         state \"{NO_VERIFIED_REFERENCE_AVAILABLE}\".\n\
         - Keep a formal legal tone.\n\
         - Use clear headings, numbered paragraphs and a proper prayer clause.\n\
         \n\
         Draft the final document now.\n"
    )
}

/// A canned drafting job with its own prompt chain.
///
/// `adjournment` and `retraction` go straight to the drafting model.
/// `scn-summary` and `scn-reply` ask the research model first and draft
/// from its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftTask {
    Adjournment,
    Retraction,
    ScnSummary,
    ScnReply,
}

impl DraftTask {
    pub const ALL: [DraftTask; 4] = [
        DraftTask::Adjournment,
        DraftTask::Retraction,
        DraftTask::ScnSummary,
        DraftTask::ScnReply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftTask::Adjournment => "adjournment",
            DraftTask::Retraction => "retraction",
            DraftTask::ScnSummary => "scn-summary",
            DraftTask::ScnReply => "scn-reply",
        }
    }

    /// The research step, if the task has one. Not yet wrapped in
    /// [`research_rules`].
    pub fn research_prompt(&self, details: &str) -> Option<String> {
        match self {
            DraftTask::Adjournment | DraftTask::Retraction => None,
            DraftTask::ScnSummary => Some(format!(
                "Summarise this GST show cause notice. Give the allegations, the \
                 period, the provisions invoked and the amounts demanded.\n\
                 \n\
                 Notice:\n\
                 {details}"
            )),
            DraftTask::ScnReply => Some(format!(
                "Provide case laws and legal grounds to defend against this GST show \
                 cause notice. For each case law give: case name, court / forum, year, \
                 one-line relevance, exact URL. Where no verified case law exists for a \
                 ground, say \"{NO_VERIFIED_REFERENCE_FOUND}\".\n\
                 \n\
                 Notice:\n\
                 {details}"
            )),
        }
    }

    /// The drafting step. `research` is the research model's answer for
    /// tasks that have a research step.
    pub fn drafting_prompt(&self, details: &str, research: Option<&str>) -> String {
        let research = research.unwrap_or_default();
        match self {
            DraftTask::Adjournment => format!(
                "You are a GST legal drafting assistant.\n\
                 \n\
                 Draft a GST adjournment application in a formal legal tone. State the \
                 reasons for seeking more time and request a next date of hearing.\n\
                 \n\
                 Facts:\n\
                 {details}\n"
            ),
            DraftTask::Retraction => format!(
                "You are a GST legal drafting assistant.\n\
                 \n\
                 Draft a retraction of a statement recorded by GST officers. Set out the \
                 circumstances in which the statement was recorded, including any \
                 coercion, duress or late-night detention the facts disclose, and the \
                 legal grounds on which it is retracted. Do NOT add circumstances that \
                 are not in the facts.\n\
                 \n\
                 Facts:\n\
                 {details}\n"
            ),
            DraftTask::ScnSummary => format!(
                "You are a GST legal drafting assistant.\n\
                 \n\
                 Rewrite this show cause notice summary in legal format, with headings \
                 and numbered paragraphs. Do NOT draft a reply.\n\
                 \n\
                 Summary:\n\
                 {research}\n"
            ),
            DraftTask::ScnReply => format!(
                "You are a GST legal drafting assistant.\n\
                 \n\
                 Draft a detailed reply to the GST show cause notice using the legal \
                 points below.\n\
                 \n\
                 Legal points:\n\
                 {research}\n\
                 \n\
                 Facts:\n\
                 {details}\n\
                 \n\
                 RULES:\n\
                 - Do NOT invent case laws or URLs.\n\
                 - Rely ONLY on case laws and URLs that appear in the legal points.\n\
                 - For any legal point without a supporting case law, \
                 state \"{NO_VERIFIED_REFERENCE_AVAILABLE}\".\n\
                 - Use clear headings, numbered paragraphs and a proper prayer clause.\n"
            ),
        }
    }
}

impl fmt::Display for DraftTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftTask {
    type Err = String;

    /// Accepts `scn-reply` as well as `scn_reply`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        DraftTask::ALL
            .into_iter()
            .find(|task| task.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = DraftTask::ALL.iter().map(DraftTask::as_str).collect();
                format!("unknown task '{s}', expected one of: {}", names.join(", "))
            })
    }
}
