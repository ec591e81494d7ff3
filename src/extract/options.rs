//! Extraction options and fixed limits.

use std::time::Duration;

/// Largest accepted upload: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Minimum number of characters a usable extraction must produce.
pub const MIN_TEXT_CHARS: usize = 50;

/// Wall-clock budget for one extraction.
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// A character repeated this many times after its first occurrence is noise.
pub const NOISE_REPEAT_RUN: usize = 10;

/// Options for extracting text from an upload.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum accepted input size in bytes
    pub max_file_size: u64,

    /// Minimum trimmed character count for a successful result
    pub min_text_chars: usize,

    /// Hard wall-clock limit (None disables the watchdog)
    pub timeout: Option<Duration>,

    /// Repeat count above which a run of one character collapses (fallback only)
    pub noise_repeat_run: usize,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted file size.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the minimum viable text length.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// Set the wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run without a watchdog thread.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the noise-suppression run length.
    pub fn with_noise_repeat_run(mut self, run: usize) -> Self {
        self.noise_repeat_run = run.max(1);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            min_text_chars: MIN_TEXT_CHARS,
            timeout: Some(EXTRACTION_TIMEOUT),
            noise_repeat_run: NOISE_REPEAT_RUN,
        }
    }
}
