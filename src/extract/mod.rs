//! Document text extraction.
//!
//! Each [`SourceFormat`] maps to an ordered list of [`TextExtractor`]
//! attempts held in an [`ExtractionPlan`]. The [`ExtractionSupervisor`]
//! enforces size and time limits, walks the attempts until one is accepted,
//! and validates the final text.
//!
//! # Example
//!
//! ```no_run
//! use hirelens::extract::{ExtractOptions, ExtractionSupervisor};
//!
//! fn main() -> hirelens::Result<()> {
//!     let supervisor = ExtractionSupervisor::new(ExtractOptions::default());
//!     let doc = supervisor.extract_path("resume.pdf")?;
//!     println!("{} characters via {:?}", doc.char_count, doc.strategy_used);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cleanup;
pub mod docx;
pub mod fallback;
pub mod options;
pub mod pdf;
pub mod progress;
pub mod supervisor;

pub use backend::{LopdfLoader, PdfBackend, PdfLoader};
pub use docx::DocxTextExtractor;
pub use fallback::PdfFallbackExtractor;
pub use options::{
    ExtractOptions, EXTRACTION_TIMEOUT, MAX_FILE_SIZE, MIN_TEXT_CHARS, NOISE_REPEAT_RUN,
};
pub use pdf::PdfTextExtractor;
pub use progress::{
    progress_channel, ProgressEvent, ProgressReporter, ProgressStage, PROGRESS_CHANNEL_CAPACITY,
};
pub use supervisor::ExtractionSupervisor;

use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which strategy produced a text result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Text layer recovered from PDF content streams
    PrimaryPdf,
    /// Heuristic byte scrubbing of the raw PDF
    FallbackPdf,
    /// Raw text of a DOCX package
    Docx,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Strategy::PrimaryPdf => "primary PDF",
            Strategy::FallbackPdf => "fallback PDF",
            Strategy::Docx => "DOCX",
        })
    }
}

/// Shared cancellation flag for one extraction run.
///
/// Strategies call [`CancelToken::check`] between pages and scan chunks so a
/// timed-out run stops at the next boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail fast once the run has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::ExtractionFailed("extraction cancelled".to_string()))
        } else {
            Ok(())
        }
    }
}

/// One extraction strategy.
///
/// Implement this trait to add or substitute an attempt in an
/// [`ExtractionPlan`].
pub trait TextExtractor: Send + Sync {
    /// Strategy identifier recorded on the result.
    fn strategy(&self) -> Strategy;

    /// Extract text from the raw file bytes.
    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String>;

    /// Per-attempt success predicate.
    ///
    /// A rejected result hands over to the next attempt exactly like an error.
    fn accepts(&self, text: &str, min_chars: usize) -> bool {
        cleanup::char_count(text) >= min_chars
    }
}

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name, used for format selection
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
    /// Declared size in bytes
    pub size: u64,
}

impl InputFile {
    /// Wrap in-memory contents; the size is the byte length.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self {
            name: name.into(),
            bytes,
            size,
        }
    }

    /// Read a file, refusing anything above [`MAX_FILE_SIZE`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_limit(path, MAX_FILE_SIZE)
    }

    /// Read a file, checking its size from metadata before touching its contents.
    pub fn open_with_limit<P: AsRef<Path>>(path: P, limit: u64) -> Result<Self> {
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        if size > limit {
            return Err(Error::FileTooLarge { size, limit });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(path)?;
        Ok(Self {
            name,
            size: bytes.len() as u64,
            bytes,
        })
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Trimmed text
    pub text: String,
    /// Format the file was read as
    pub source_format: SourceFormat,
    /// Strategy whose output was accepted
    pub strategy_used: Strategy,
    /// Number of characters in `text`
    pub char_count: usize,
}

impl ExtractedDocument {
    pub(crate) fn new(text: String, source_format: SourceFormat, strategy_used: Strategy) -> Self {
        let char_count = text.chars().count();
        Self {
            text,
            source_format,
            strategy_used,
            char_count,
        }
    }
}

/// Ordered extraction attempts per source format.
#[derive(Clone, Default)]
pub struct ExtractionPlan {
    attempts: HashMap<SourceFormat, Vec<Arc<dyn TextExtractor>>>,
}

impl ExtractionPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard plan: PDF primary then fallback, DOCX raw text.
    pub fn with_defaults(options: &ExtractOptions) -> Self {
        Self::with_pdf_loader(Arc::new(LopdfLoader), options)
    }

    /// The standard plan with a substitute PDF parser.
    pub fn with_pdf_loader(loader: Arc<dyn PdfLoader>, options: &ExtractOptions) -> Self {
        let fallback = PdfFallbackExtractor::new()
            .with_noise_repeat_run(options.noise_repeat_run)
            .with_min_text_chars(options.min_text_chars);

        let mut plan = Self::new();
        plan.register(SourceFormat::Pdf, Arc::new(PdfTextExtractor::new(loader)));
        plan.register(SourceFormat::Pdf, Arc::new(fallback));
        plan.register(SourceFormat::Docx, Arc::new(DocxTextExtractor::new()));
        plan
    }

    /// Append an attempt to the end of a format's list.
    pub fn register(&mut self, format: SourceFormat, extractor: Arc<dyn TextExtractor>) {
        self.attempts.entry(format).or_default().push(extractor);
    }

    /// Replace every attempt for a format.
    pub fn set(&mut self, format: SourceFormat, extractors: Vec<Arc<dyn TextExtractor>>) {
        self.attempts.insert(format, extractors);
    }

    /// Attempts for a format, in order.
    pub fn attempts(&self, format: SourceFormat) -> &[Arc<dyn TextExtractor>] {
        self.attempts.get(&format).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Strategy identifiers for a format, in order.
    pub fn strategies(&self, format: SourceFormat) -> Vec<Strategy> {
        self.attempts(format).iter().map(|e| e.strategy()).collect()
    }

    /// Check whether any attempt is registered for a format.
    pub fn supports(&self, format: SourceFormat) -> bool {
        !self.attempts(format).is_empty()
    }
}

impl std::fmt::Debug for ExtractionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for format in [SourceFormat::Pdf, SourceFormat::Docx] {
            if self.supports(format) {
                map.entry(&format, &self.strategies(format));
            }
        }
        map.finish()
    }
}
