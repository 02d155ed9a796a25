use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Idle,
    Loading,
    Processing,
    Done,
    Failed,
}

/// Observable state of the engine's current operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingJob {
    pub phase: JobPhase,
    pub progress_percent: f64,
}

impl Default for ProcessingJob {
    fn default() -> Self {
        Self {
            phase: JobPhase::Idle,
            progress_percent: 0.0,
        }
    }
}

/// Publishes [`ProcessingJob`] updates; progress never moves backwards
/// until the next [`ProgressTracker::reset`].
pub struct ProgressTracker {
    tx: watch::Sender<ProcessingJob>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ProcessingJob::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProcessingJob> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ProcessingJob {
        *self.tx.borrow()
    }

    pub fn set_phase(&self, phase: JobPhase) {
        self.tx.send_if_modified(|job| {
            let changed = job.phase != phase;
            job.phase = phase;
            changed
        });
    }

    /// Start a new operation at 0%.
    pub fn reset(&self, phase: JobPhase) {
        self.tx.send_replace(ProcessingJob {
            phase,
            progress_percent: 0.0,
        });
    }

    pub fn advance(&self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        self.tx.send_if_modified(|job| {
            if percent > job.progress_percent {
                job.progress_percent = percent;
                true
            } else {
                false
            }
        });
    }

    /// Report `ratio` (0..=1) of the band `[from, to]`.
    pub fn advance_within(&self, from: f64, to: f64, ratio: f64) {
        self.advance(from + (to - from) * ratio.clamp(0.0, 1.0));
    }

    pub fn finish(&self) {
        self.tx.send_replace(ProcessingJob {
            phase: JobPhase::Done,
            progress_percent: 100.0,
        });
    }

    pub fn fail(&self) {
        self.set_phase(JobPhase::Failed);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
