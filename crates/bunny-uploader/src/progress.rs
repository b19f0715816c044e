//! Per-file upload progress.
//!
//! Every upload task reports through a [`ProgressReporter`] supplied by the caller.
//! [`FileProgress`] keeps the reported value monotonic for one file and holds it
//! below 100 until the storage endpoint has acknowledged the whole file.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use bunny_core::models::{progress_percent, UploadProgress};

/// Receives progress updates from in-flight uploads.
pub trait ProgressReporter: Send + Sync {
    /// A file reached a new whole percentage.
    fn update(&self, file_name: &str, percent: u8);

    /// The batch finished (successfully or not); drop all entries.
    fn clear(&self) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn update(&self, file_name: &str, percent: u8) {
        self(file_name, percent)
    }
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn update(&self, _file_name: &str, _percent: u8) {}
}

/// Shared progress list keyed by file name, readable while uploads run.
#[derive(Debug, Default, Clone)]
pub struct ProgressTracker {
    entries: Arc<Mutex<BTreeMap<String, u8>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<u8> {
        self.lock().get(file_name).copied()
    }

    /// Current entries sorted by file name.
    pub fn snapshot(&self) -> Vec<UploadProgress> {
        self.lock()
            .iter()
            .map(|(file_name, percent)| UploadProgress {
                file_name: file_name.clone(),
                percent: *percent,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, u8>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressReporter for ProgressTracker {
    fn update(&self, file_name: &str, percent: u8) {
        self.lock().insert(file_name.to_string(), percent);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Logs progress through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn update(&self, file_name: &str, percent: u8) {
        tracing::info!(file_name = %file_name, percent, "Upload progress");
    }
}

#[derive(Debug, Default)]
struct FileProgressState {
    sent: u64,
    last: Option<u8>,
}

/// Progress of a single file within one upload attempt.
pub struct FileProgress {
    file_name: String,
    total: u64,
    state: Mutex<FileProgressState>,
    reporter: Arc<dyn ProgressReporter>,
}

impl FileProgress {
    pub fn new(file_name: &str, total: u64, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            file_name: file_name.to_string(),
            total,
            state: Mutex::new(FileProgressState::default()),
            reporter,
        }
    }

    /// Report an absolute byte count (single-shot uploads).
    pub fn set_sent(&self, sent: u64) {
        let mut state = self.lock();
        state.sent = state.sent.max(sent);
        self.emit(&mut state, false);
    }

    /// Add bytes sent since the last call (multipart uploads, summed over parts).
    pub fn add_sent(&self, bytes: u64) {
        let mut state = self.lock();
        state.sent = state.sent.saturating_add(bytes);
        self.emit(&mut state, false);
    }

    /// The storage endpoint acknowledged the whole file.
    pub fn complete(&self) {
        let mut state = self.lock();
        state.sent = self.total;
        self.emit(&mut state, true);
    }

    fn emit(&self, state: &mut FileProgressState, done: bool) {
        let percent = if done {
            100
        } else {
            progress_percent(state.sent, self.total).min(99)
        };
        if state.last.is_some_and(|last| percent <= last) {
            return;
        }
        state.last = Some(percent);
        self.reporter.update(&self.file_name, percent);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FileProgressState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
