//! OCR engine traits and the lazily constructed shared engine handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::RenderedPage;

/// Failure to bring up a recognition engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The binary was built without an OCR backend.
    #[error("OCR support not compiled in: {0}")]
    NotCompiled(String),
    /// The engine exists but failed to load (missing language data,
    /// missing shared library, out of memory).
    #[error("failed to initialize OCR engine: {0}")]
    Initialization(String),
}

/// A recognition pass did not produce text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// This page could not be read; later pages may still succeed.
    #[error("recognition failed: {0}")]
    Page(String),
    /// The engine went away mid-run and could not be brought back.
    #[error(transparent)]
    EngineLost(#[from] EngineError),
}

/// A text recognition model.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize text fragments on one page image, in reading order.
    fn recognize(&self, page: &RenderedPage) -> Result<Vec<String>, RecognitionError>;
}

/// Hands out the recognition engine, constructing it on demand.
pub trait EngineProvider: Send + Sync {
    fn engine(&self) -> Result<Arc<dyn Recognizer>, EngineError>;
}

type Factory = dyn Fn() -> Result<Arc<dyn Recognizer>, EngineError> + Send + Sync;

/// A recognizer that is built on first use and reused afterwards.
///
/// Construction runs at most once at a time: concurrent callers block until
/// the first one finishes. A failed construction is not remembered, so the
/// next call tries again.
pub struct LazyEngine {
    cell: OnceCell<Arc<dyn Recognizer>>,
    factory: Box<Factory>,
    attempts: AtomicUsize,
}

impl LazyEngine {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Recognizer>, EngineError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Wrap an already constructed recognizer.
    pub fn ready(recognizer: Arc<dyn Recognizer>) -> Self {
        let engine = Self::new(|| {
            Err(EngineError::Initialization(
                "pre-initialized engine has no factory".into(),
            ))
        });
        // A freshly created cell cannot already be set.
        let _ = engine.cell.set(recognizer);
        engine
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// How many times the factory has been invoked.
    pub fn init_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EngineProvider for LazyEngine {
    fn engine(&self) -> Result<Arc<dyn Recognizer>, EngineError> {
        self.cell
            .get_or_try_init(|| {
                let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(attempt, "initializing OCR engine");
                match (self.factory)() {
                    Ok(engine) => {
                        tracing::info!(engine = engine.name(), attempt, "OCR engine ready");
                        Ok(engine)
                    }
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "OCR engine initialization failed");
                        Err(e)
                    }
                }
            })
            .cloned()
    }
}

impl std::fmt::Debug for LazyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyEngine")
            .field("initialized", &self.is_initialized())
            .field("attempts", &self.init_attempts())
            .finish()
    }
}
