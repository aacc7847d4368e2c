//! Cooperative stop conditions and progress counters for long runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::model::TerminationReason;

/// Shared progress/cancellation handle checked once per iteration or trial.
///
/// Clones share the same atomics, so a clone handed to another thread can
/// cancel the run or read its progress.
#[derive(Debug, Clone)]
pub struct RunControl {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl RunControl {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Create from an externally owned cancel flag
    pub fn from_flag(total: usize, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            ..Self::new(total)
        }
    }

    /// Stop once `timeout` has elapsed from now
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Reason to stop now, if any. Cancellation takes precedence over the deadline.
    #[must_use]
    pub fn stop_reason(&self) -> Option<TerminationReason> {
        if self.is_cancelled() {
            Some(TerminationReason::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(TerminationReason::TimedOut)
        } else {
            None
        }
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(0)
    }
}
