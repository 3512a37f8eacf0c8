//! Summary, research, draft, audit and export chained over canned models.

use std::io::Read;
use std::sync::Arc;

use taxdraft_assist::prompts::{NO_VERIFIED_REFERENCE_AVAILABLE, NO_VERIFIED_REFERENCE_FOUND};
use taxdraft_assist::{ChatBackend, ChatFuture, CitationAudit, NoticeAssistant, docx_bytes};

/// Answers by looking for a marker in the prompt.
struct Scripted {
    name: &'static str,
    replies: Vec<(&'static str, &'static str)>,
}

impl ChatBackend for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a> {
        Box::pin(async move {
            let reply = self
                .replies
                .iter()
                .find(|(marker, _)| prompt.contains(marker))
                .map(|(_, reply)| reply.to_string())
                .unwrap_or_else(|| panic!("{} got an unexpected prompt", self.name));
            Ok(reply)
        })
    }
}

const NOTICE: &str = "FORM GST DRC-01\nSummary of show cause notice\n\
                      Tax period: April 2018 to March 2019\n\
                      Excess input tax credit of Rs. 2,40,000 availed.";

#[tokio::test]
async fn notice_to_docx() {
    let drafting = Arc::new(Scripted {
        name: "openai",
        replies: vec![
            ("Only summarise", "Allegation: excess ITC for FY 2018-19."),
            (
                "Draft the final document now",
                "BEFORE THE PROPER OFFICER\n\n\
                 1. Reliance is placed on https://indiankanoon.org/doc/42/.\n\
                 2. Also https://invented.example/case.\n\
                 3. Interest is not leviable. No verified reference available.",
            ),
        ],
    });
    let research = Arc::new(Scripted {
        name: "perplexity",
        replies: vec![(
            "GST legal research assistant",
            "## Case law\n- ABC Traders v. State (2021) https://indiankanoon.org/doc/42\n\
             ## Interest\n- No verified reference found",
        )],
    });
    let assistant = NoticeAssistant::new(drafting, research);
    let instructions = "Draft a reply contesting the ITC reversal";

    let summary = assistant.summarize_notice(NOTICE).await.unwrap();
    let note = assistant
        .research_support(instructions, &summary)
        .await
        .unwrap();
    let draft = assistant
        .draft_document(instructions, &summary, &note)
        .await
        .unwrap();

    let audit = CitationAudit::audit(&note, &draft);
    assert_eq!(audit.unsupported_urls, vec!["https://invented.example/case"]);
    assert_eq!(audit.research_gaps, 1);
    assert_eq!(audit.unsupported_points, 1);
    assert!(note.contains(NO_VERIFIED_REFERENCE_FOUND));
    assert!(draft.contains(NO_VERIFIED_REFERENCE_AVAILABLE));

    let docx = docx_bytes(&draft).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert_eq!(xml.matches("<w:p>").count() + xml.matches("<w:p/>").count(), 5);
    assert!(xml.contains("BEFORE THE PROPER OFFICER"));
}
