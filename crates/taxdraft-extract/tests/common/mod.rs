//! In-memory backend and recognizer for driving the extractor.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use taxdraft_core::{
    BackendError, Document, EngineError, PageSource, PdfBackend, RecognitionError, Recognizer,
    RenderedPage,
};

/// One scripted page.
#[derive(Clone, Debug)]
pub struct FakePage {
    /// Structural text layer, or the message of a page-local decode error.
    pub text: Result<String, String>,
    /// Whether the page object can be loaded at all.
    pub loads: bool,
    /// Whether rendering succeeds.
    pub renders: bool,
    /// What the recognizer returns for this page's image.
    pub ocr: Result<Vec<String>, RecognitionError>,
}

impl FakePage {
    pub fn text(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
            loads: true,
            renders: true,
            ocr: Ok(Vec::new()),
        }
    }

    /// A page with no text layer whose image reads as `lines`.
    pub fn scanned(lines: &[&str]) -> Self {
        Self {
            text: Ok(String::new()),
            loads: true,
            renders: true,
            ocr: Ok(lines.iter().map(|l| l.to_string()).collect()),
        }
    }

    pub fn unreadable_text(mut self) -> Self {
        self.text = Err("broken font encoding".into());
        self
    }

    pub fn unrenderable(mut self) -> Self {
        self.renders = false;
        self
    }

    pub fn unrecognizable(mut self) -> Self {
        self.ocr = Err(RecognitionError::Page("engine crashed on this image".into()));
        self
    }

    /// The page tree entry is dangling: every projection reports a
    /// container error.
    pub fn unloadable(mut self) -> Self {
        self.loads = false;
        self
    }

    /// The engine dies on this page and cannot be reloaded.
    pub fn loses_engine(mut self) -> Self {
        self.ocr = Err(RecognitionError::EngineLost(EngineError::Initialization(
            "eng.traineddata vanished".into(),
        )));
        self
    }
}

/// A scripted [`PdfBackend`]. Any document whose bytes do not start with
/// `%PDF-` is rejected as malformed; otherwise the scripted pages are served.
pub struct FakeBackend {
    pages: Arc<Vec<FakePage>>,
    open_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages: Arc::new(pages),
            open_calls: AtomicUsize::new(0),
        }
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    /// The recognizer that reads this backend's scripted OCR output.
    pub fn recognizer(&self) -> Arc<FakeRecognizer> {
        Arc::new(FakeRecognizer {
            pages: Arc::clone(&self.pages),
            calls: AtomicUsize::new(0),
        })
    }
}

impl PdfBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(&self, document: &Document) -> Result<Box<dyn PageSource>, BackendError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if !document.bytes().starts_with(b"%PDF-") {
            return Err(BackendError::OpenError("no PDF header".into()));
        }
        Ok(Box::new(FakePages {
            pages: Arc::clone(&self.pages),
        }))
    }
}

struct FakePages {
    pages: Arc<Vec<FakePage>>,
}

impl FakePages {
    fn load(&self, index: usize) -> Result<(), BackendError> {
        if self.pages[index].loads {
            Ok(())
        } else {
            Err(BackendError::OpenError(format!(
                "page {} could not be loaded: object 12 0 R is missing",
                index + 1
            )))
        }
    }
}

impl PageSource for FakePages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        self.load(index)?;
        self.pages[index]
            .text
            .clone()
            .map_err(|message| BackendError::PageError {
                page: index + 1,
                message,
            })
    }

    fn render_page(&self, index: usize, _scale: f32) -> Result<RenderedPage, BackendError> {
        self.load(index)?;
        if !self.pages[index].renders {
            return Err(BackendError::RenderError {
                page: index + 1,
                message: "rasterizer out of memory".into(),
            });
        }
        // The page index travels in the width so the recognizer can find
        // its script.
        Ok(RenderedPage {
            width: index as u32,
            height: 1,
            png: Vec::new(),
        })
    }
}

pub struct FakeRecognizer {
    pages: Arc<Vec<FakePage>>,
    calls: AtomicUsize,
}

impl FakeRecognizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Recognizer for FakeRecognizer {
    fn name(&self) -> &str {
        "fake-ocr"
    }

    fn recognize(&self, page: &RenderedPage) -> Result<Vec<String>, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages[page.width as usize].ocr.clone()
    }
}

pub fn pdf() -> Document {
    Document::from_bytes(b"%PDF-1.7\nscripted".to_vec())
}

/// A sentence of exactly `n` characters.
pub fn chars(n: usize) -> String {
    "x".repeat(n)
}

/// A real single-font PDF with one page per entry, for backend-level tests.
pub fn minimal_pdf(pages: &[&str]) -> Document {
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        let stream: String = text
            .lines()
            .enumerate()
            .map(|(j, line)| format!("BT /F1 11 Tf 50 {} Td ({line}) Tj ET\n", 740 - 14 * j))
            .collect();
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}endstream",
            stream.len()
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{obj}\nendobj\n", i + 1).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(
        format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
    );
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    Document::from_bytes(out)
}
