//! Progress reporting and cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Shared stop flag, polled between spins
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; runs finish their current spin first
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Snapshot of a running simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub completed: u64,
    pub requested: u64,
    pub total_wagered: f64,
    pub total_won: f64,
}

impl ProgressUpdate {
    /// Progress (0.0 - 1.0)
    pub fn fraction(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.completed as f64 / self.requested as f64
        }
    }

    /// Running RTP, None before anything was wagered
    pub fn rtp(&self) -> Option<f64> {
        (self.total_wagered > 0.0).then(|| self.total_won / self.total_wagered)
    }
}

/// Called with running totals every `progress_interval` spins and once at the end
pub type ProgressCallback<'a> = dyn FnMut(&ProgressUpdate) + 'a;

/// Latest progress of each run in a parallel batch, readable from any thread
#[derive(Debug, Default)]
pub struct BatchMonitor {
    runs: Mutex<Vec<Option<ProgressUpdate>>>,
}

impl BatchMonitor {
    pub fn new(runs: usize) -> Self {
        Self {
            runs: Mutex::new(vec![None; runs]),
        }
    }

    pub(crate) fn record(&self, run: usize, update: ProgressUpdate) {
        let mut runs = self.runs.lock();
        if run >= runs.len() {
            runs.resize(run + 1, None);
        }
        runs[run] = Some(update);
    }

    /// Latest update per run, None for runs that have not reported yet
    pub fn snapshot(&self) -> Vec<Option<ProgressUpdate>> {
        self.runs.lock().clone()
    }

    /// Spins completed over spins requested, across reported runs
    pub fn overall_fraction(&self) -> f64 {
        let runs = self.runs.lock();
        let (completed, requested) = runs
            .iter()
            .flatten()
            .fold((0u64, 0u64), |(c, r), u| (c + u.completed, r + u.requested));
        if requested == 0 {
            0.0
        } else {
            completed as f64 / requested as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_update_ratios() {
        let update = ProgressUpdate {
            completed: 25,
            requested: 100,
            total_wagered: 20.0,
            total_won: 18.0,
        };
        assert_eq!(update.fraction(), 0.25);
        assert_eq!(update.rtp(), Some(0.9));

        let empty = ProgressUpdate {
            completed: 0,
            requested: 0,
            total_wagered: 0.0,
            total_won: 0.0,
        };
        assert_eq!(empty.fraction(), 0.0);
        assert_eq!(empty.rtp(), None);
    }

    #[test]
    fn test_batch_monitor() {
        let monitor = BatchMonitor::new(2);
        assert_eq!(monitor.overall_fraction(), 0.0);

        monitor.record(
            0,
            ProgressUpdate {
                completed: 50,
                requested: 100,
                total_wagered: 50.0,
                total_won: 40.0,
            },
        );
        monitor.record(
            1,
            ProgressUpdate {
                completed: 100,
                requested: 100,
                total_wagered: 90.0,
                total_won: 99.0,
            },
        );

        assert_eq!(monitor.overall_fraction(), 0.75);
        assert!(monitor.snapshot().iter().all(Option::is_some));
    }
}
