//! Extraction supervisor: limits, ordered attempts and validation.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::detect::{sniff, SourceFormat};
use crate::error::{Error, Result};

use super::cleanup::char_count;
use super::progress::{ProgressEvent, ProgressReporter, ProgressStage};
use super::{
    CancelToken, ExtractOptions, ExtractedDocument, ExtractionPlan, InputFile, PdfLoader,
    TextExtractor,
};

/// Bytes handed to the signature check.
const SNIFF_LEN: usize = 16;

/// Runs an [`ExtractionPlan`] under size and time limits.
#[derive(Debug, Clone)]
pub struct ExtractionSupervisor {
    options: ExtractOptions,
    plan: Arc<ExtractionPlan>,
    progress: Option<Sender<ProgressEvent>>,
}

impl ExtractionSupervisor {
    /// Create a supervisor with the standard plan.
    pub fn new(options: ExtractOptions) -> Self {
        let plan = ExtractionPlan::with_defaults(&options);
        Self {
            options,
            plan: Arc::new(plan),
            progress: None,
        }
    }

    /// Create a supervisor whose PDF attempts parse through `loader`.
    pub fn with_pdf_loader(options: ExtractOptions, loader: Arc<dyn PdfLoader>) -> Self {
        let plan = ExtractionPlan::with_pdf_loader(loader, &options);
        Self {
            options,
            plan: Arc::new(plan),
            progress: None,
        }
    }

    /// Replace the extraction plan.
    pub fn with_plan(mut self, plan: ExtractionPlan) -> Self {
        self.plan = Arc::new(plan);
        self
    }

    /// Send progress updates to `sender`.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    /// Extract text from a file on disk.
    ///
    /// The size limit is checked against file metadata before reading.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Result<ExtractedDocument> {
        let file = InputFile::open_with_limit(path, self.options.max_file_size)?;
        self.extract(file)
    }

    /// Extract text from in-memory contents.
    pub fn extract_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<ExtractedDocument> {
        self.extract(InputFile::new(name, bytes))
    }

    /// Extract text from an uploaded file.
    pub fn extract(&self, file: InputFile) -> Result<ExtractedDocument> {
        let run = self.prepare(&file)?;

        match self.options.timeout {
            Some(limit) => run_with_watchdog(run, file.bytes, limit),
            None => run.execute(&file.bytes),
        }
    }

    /// Async variant of [`extract`](Self::extract) for tokio runtimes.
    #[cfg(feature = "async")]
    pub async fn extract_async(&self, file: InputFile) -> Result<ExtractedDocument> {
        let run = self.prepare(&file)?;
        let cancel = run.cancel.clone();
        let bytes = file.bytes;
        let task = tokio::task::spawn_blocking(move || run.execute(&bytes));

        let joined = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.cancel();
                    log::warn!("extraction timed out after {:?}", limit);
                    return Err(Error::ExtractionTimeout(limit));
                }
            },
            None => task.await,
        };

        joined.map_err(|e| Error::ExtractionFailed(format!("extraction task failed: {}", e)))?
    }

    /// Checks that run before any parsing: size, format and plan lookup.
    fn prepare(&self, file: &InputFile) -> Result<Run> {
        let limit = self.options.max_file_size;
        let size = file.size.max(file.bytes.len() as u64);
        if size > limit {
            return Err(Error::FileTooLarge { size, limit });
        }

        let reporter = ProgressReporter::new(self.progress.clone());
        reporter.report(ProgressStage::Reading);

        let head = &file.bytes[..file.bytes.len().min(SNIFF_LEN)];
        let sniffed = sniff(&file.name, head)?;
        log::debug!("{} detected as {}", file.name, sniffed.format);
        reporter.report(ProgressStage::Detected);

        let attempts = self.plan.attempts(sniffed.format).to_vec();
        if attempts.is_empty() {
            return Err(Error::UnsupportedFormat(
                sniffed.format.extension().to_string(),
            ));
        }

        Ok(Run {
            format: sniffed.format,
            attempts,
            min_chars: self.options.min_text_chars,
            reporter,
            cancel: CancelToken::new(),
        })
    }
}

impl Default for ExtractionSupervisor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

/// Execute `run` on a worker thread, abandoning it after `limit`.
fn run_with_watchdog(run: Run, bytes: Vec<u8>, limit: Duration) -> Result<ExtractedDocument> {
    let cancel = run.cancel.clone();
    let (tx, rx) = bounded(1);

    thread::Builder::new()
        .name("hirelens-extract".to_string())
        .spawn(move || {
            let result = run.execute(&bytes);
            // The receiver is gone after a timeout; the late result is dropped.
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            cancel.cancel();
            log::warn!("extraction timed out after {:?}", limit);
            Err(Error::ExtractionTimeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => Err(Error::ExtractionFailed(
            "extraction worker stopped unexpectedly".to_string(),
        )),
    }
}

/// One extraction run: the attempts for a format plus per-run state.
struct Run {
    format: SourceFormat,
    attempts: Vec<Arc<dyn TextExtractor>>,
    min_chars: usize,
    reporter: ProgressReporter,
    cancel: CancelToken,
}

impl Run {
    /// Try each attempt in order; the first accepted result wins.
    fn execute(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let mut last_failure = None;

        for (index, extractor) in self.attempts.iter().enumerate() {
            self.cancel.check()?;
            self.reporter.report(if index == 0 {
                ProgressStage::Primary
            } else {
                ProgressStage::Fallback
            });

            let strategy = extractor.strategy();
            match extractor.extract(bytes, &self.cancel) {
                Ok(text) if extractor.accepts(&text, self.min_chars) => {
                    log::info!("{} extraction accepted", strategy);
                    return self.finish(text, extractor.as_ref());
                }
                Ok(text) => {
                    let chars = char_count(&text);
                    log::debug!("{} extraction rejected: {} characters", strategy, chars);
                    last_failure = Some(Error::InsufficientText {
                        chars,
                        min: self.min_chars,
                    });
                }
                Err(e) if self.cancel.is_cancelled() => return Err(e),
                Err(e) if e.is_recoverable() => {
                    log::info!("{} extraction failed: {}", strategy, e);
                    last_failure = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(match last_failure {
            Some(e @ Error::InsufficientText { .. }) | Some(e @ Error::ExtractionFailed(_)) => e,
            Some(other) => Error::ExtractionFailed(other.to_string()),
            None => Error::UnsupportedFormat(self.format.extension().to_string()),
        })
    }

    /// Post-conditions shared by every strategy: trimmed and long enough.
    fn finish(&self, text: String, extractor: &dyn TextExtractor) -> Result<ExtractedDocument> {
        self.reporter.report(ProgressStage::Validating);

        let text = text.trim().to_string();
        let chars = text.chars().count();
        if chars < self.min_chars {
            return Err(Error::InsufficientText {
                chars,
                min: self.min_chars,
            });
        }

        self.reporter.report(ProgressStage::Done);
        Ok(ExtractedDocument::new(
            text,
            self.format,
            extractor.strategy(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::progress::progress_channel;
    use crate::extract::Strategy;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LONG: &str = "Senior software engineer with a decade of backend and platform experience.";

    enum Outcome {
        Text(&'static str),
        Fail,
        Sleep(Duration),
    }

    struct Scripted {
        strategy: Strategy,
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(strategy: Strategy, outcome: Outcome) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let extractor = Arc::new(Self {
                strategy,
                outcome,
                calls: calls.clone(),
            });
            (extractor, calls)
        }
    }

    impl TextExtractor for Scripted {
        fn strategy(&self) -> Strategy {
            self.strategy
        }

        fn extract(&self, _bytes: &[u8], cancel: &CancelToken) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Outcome::Text(text) => Ok(text.to_string()),
                Outcome::Fail => Err(Error::ExtractionFailed("scripted".into())),
                Outcome::Sleep(d) => {
                    thread::sleep(*d);
                    cancel.check()?;
                    Ok(LONG.to_string())
                }
            }
        }
    }

    fn pdf_plan(first: Arc<Scripted>, second: Arc<Scripted>) -> ExtractionPlan {
        let mut plan = ExtractionPlan::new();
        plan.register(SourceFormat::Pdf, first);
        plan.register(SourceFormat::Pdf, second);
        plan
    }

    fn supervisor(plan: ExtractionPlan) -> ExtractionSupervisor {
        ExtractionSupervisor::default().with_plan(plan)
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text(LONG));
        let (fallback, fallback_calls) = Scripted::new(Strategy::FallbackPdf, Outcome::Fail);
        let doc = supervisor(pdf_plan(primary, fallback))
            .extract_bytes("cv.pdf", b"%PDF-1.4".to_vec())
            .unwrap();

        assert_eq!(doc.strategy_used, Strategy::PrimaryPdf);
        assert_eq!(doc.source_format, SourceFormat::Pdf);
        assert_eq!(doc.char_count, LONG.chars().count());
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_primary_falls_back() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text("too short"));
        let (fallback, calls) = Scripted::new(Strategy::FallbackPdf, Outcome::Text(LONG));
        let doc = supervisor(pdf_plan(primary, fallback))
            .extract_bytes("cv.pdf", Vec::new())
            .unwrap();

        assert_eq!(doc.strategy_used, Strategy::FallbackPdf);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_short_is_insufficient_text() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Fail);
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Text("  tiny  "));
        let err = supervisor(pdf_plan(primary, fallback))
            .extract_bytes("cv.pdf", Vec::new())
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientText { chars: 4, min: 50 }));
    }

    #[test]
    fn test_last_failure_is_extraction_failed() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text("short"));
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Fail);
        let err = supervisor(pdf_plan(primary, fallback))
            .extract_bytes("cv.pdf", Vec::new())
            .unwrap_err();

        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[test]
    fn test_text_is_trimmed() {
        let padded = "\n\n  Senior software engineer with a decade of backend and platform experience.  \n";
        let (docx, _) = Scripted::new(Strategy::Docx, Outcome::Text(padded));
        let mut plan = ExtractionPlan::new();
        plan.register(SourceFormat::Docx, docx);

        let doc = supervisor(plan).extract_bytes("cv.docx", Vec::new()).unwrap();
        assert_eq!(doc.text, LONG);
    }

    #[test]
    fn test_size_checked_before_any_attempt() {
        let (primary, calls) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text(LONG));
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Text(LONG));
        let file = InputFile {
            name: "cv.pdf".into(),
            bytes: Vec::new(),
            size: 10 * 1024 * 1024 + 1,
        };
        let err = supervisor(pdf_plan(primary, fallback)).extract(file).unwrap_err();

        assert!(matches!(err, Error::FileTooLarge { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ExtractionSupervisor::default()
            .extract_bytes("cv.txt", LONG.as_bytes().to_vec())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_format_without_attempts() {
        let err = supervisor(ExtractionPlan::new())
            .extract_bytes("cv.docx", Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_timeout() {
        let (slow, _) = Scripted::new(
            Strategy::PrimaryPdf,
            Outcome::Sleep(Duration::from_millis(500)),
        );
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Text(LONG));
        let options = ExtractOptions::default().with_timeout(Duration::from_millis(20));
        let err = ExtractionSupervisor::new(options)
            .with_plan(pdf_plan(slow, fallback))
            .extract_bytes("cv.pdf", Vec::new())
            .unwrap_err();

        assert!(matches!(err, Error::ExtractionTimeout(d) if d == Duration::from_millis(20)));
    }

    #[test]
    fn test_progress_is_ordered() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Fail);
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Text(LONG));
        let (tx, rx) = progress_channel(16);
        supervisor(pdf_plan(primary, fallback))
            .with_progress(tx)
            .extract_bytes("cv.pdf", Vec::new())
            .unwrap();

        let stages: Vec<ProgressStage> = rx.try_iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![
                ProgressStage::Reading,
                ProgressStage::Detected,
                ProgressStage::Primary,
                ProgressStage::Fallback,
                ProgressStage::Validating,
                ProgressStage::Done,
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text(LONG));
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Fail);
        let supervisor = supervisor(pdf_plan(primary, fallback));
        let a = supervisor.extract_bytes("cv.pdf", vec![1, 2, 3]).unwrap();
        let b = supervisor.extract_bytes("cv.pdf", vec![1, 2, 3]).unwrap();
        assert_eq!(a, b);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_extract_async() {
        let (primary, _) = Scripted::new(Strategy::PrimaryPdf, Outcome::Text(LONG));
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Fail);
        let doc = supervisor(pdf_plan(primary, fallback))
            .extract_async(InputFile::new("cv.pdf", Vec::new()))
            .await
            .unwrap();
        assert_eq!(doc.strategy_used, Strategy::PrimaryPdf);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_extract_async_timeout() {
        let (slow, _) = Scripted::new(
            Strategy::PrimaryPdf,
            Outcome::Sleep(Duration::from_millis(300)),
        );
        let (fallback, _) = Scripted::new(Strategy::FallbackPdf, Outcome::Text(LONG));
        let options = ExtractOptions::default().with_timeout(Duration::from_millis(20));
        let err = ExtractionSupervisor::new(options)
            .with_plan(pdf_plan(slow, fallback))
            .extract_async(InputFile::new("cv.pdf", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionTimeout(_)));
    }
}
