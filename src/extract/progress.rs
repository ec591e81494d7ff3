//! Advisory progress reporting.
//!
//! Updates travel over a bounded channel and are sent with `try_send`: a slow
//! observer loses updates instead of stalling extraction. Within one run the
//! reported percentage never decreases.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Default capacity of the progress channel.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// Extraction milestones, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Reading,
    Detected,
    Primary,
    Fallback,
    Validating,
    Done,
}

impl ProgressStage {
    pub fn percent(&self) -> u8 {
        match self {
            ProgressStage::Reading => 10,
            ProgressStage::Detected => 20,
            ProgressStage::Primary => 40,
            ProgressStage::Fallback => 70,
            ProgressStage::Validating => 90,
            ProgressStage::Done => 100,
        }
    }

    /// Short label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStage::Reading => "Reading file",
            ProgressStage::Detected => "Detecting format",
            ProgressStage::Primary => "Extracting text",
            ProgressStage::Fallback => "Trying fallback method",
            ProgressStage::Validating => "Validating text",
            ProgressStage::Done => "Done",
        }
    }
}

/// A progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub stage: ProgressStage,
}

/// Create a bounded progress channel.
pub fn progress_channel(capacity: usize) -> (Sender<ProgressEvent>, Receiver<ProgressEvent>) {
    bounded(capacity.max(1))
}

/// Sends the progress of one run. Clones share the monotonic high-water mark.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<Sender<ProgressEvent>>,
    high_water: Arc<AtomicU8>,
}

impl ProgressReporter {
    pub fn new(sender: Option<Sender<ProgressEvent>>) -> Self {
        Self {
            sender,
            high_water: Arc::new(AtomicU8::new(0)),
        }
    }

    /// A reporter that discards every update.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Report a stage unless it would move progress backwards.
    pub fn report(&self, stage: ProgressStage) {
        let percent = stage.percent();
        let previous = self.high_water.fetch_max(percent, Ordering::SeqCst);
        if percent < previous {
            return;
        }

        if let Some(sender) = &self.sender {
            if sender.try_send(ProgressEvent { percent, stage }).is_err() {
                log::trace!("progress update {}% dropped", percent);
            }
        }
    }

    /// Highest percentage reported so far.
    pub fn percent(&self) -> u8 {
        self.high_water.load(Ordering::SeqCst)
    }
}
