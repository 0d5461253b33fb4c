use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use serde::Serialize;
use tracing::info;

/// Workflow engine counters
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub attempted: AtomicU64,
    pub committed: AtomicU64,
    pub rejected_illegal: AtomicU64,
    pub rejected_validation: AtomicU64,
    pub commit_failures: AtomicU64,
    pub side_effect_failures: AtomicU64,
    pub timed: AtomicU64,
    pub total_duration_us: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_illegal(&self) {
        self.rejected_illegal.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.rejected_validation.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit_failure(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_side_effect_failure(&self) {
        self.side_effect_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Every transition is timed, whatever its outcome
    pub fn record_duration(&self, duration: Duration) {
        self.timed.fetch_add(1, Ordering::Relaxed);
        self.total_duration_us
            .fetch_add(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX), Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            attempted: self.attempted.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rejected_illegal: self.rejected_illegal.load(Ordering::Relaxed),
            rejected_validation: self.rejected_validation.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            side_effect_failures: self.side_effect_failures.load(Ordering::Relaxed),
            timed: self.timed.load(Ordering::Relaxed),
            total_duration_us: self.total_duration_us.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Workflow metrics: attempted={}, committed={}, illegal={}, validation={}, commit_failures={}, side_effect_failures={}, timed={}, total_duration_us={}",
            stats.attempted,
            stats.committed,
            stats.rejected_illegal,
            stats.rejected_validation,
            stats.commit_failures,
            stats.side_effect_failures,
            stats.timed,
            stats.total_duration_us
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub attempted: u64,
    pub committed: u64,
    pub rejected_illegal: u64,
    pub rejected_validation: u64,
    pub commit_failures: u64,
    pub side_effect_failures: u64,
    pub timed: u64,
    pub total_duration_us: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = WorkflowMetrics::new();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_commit();
        metrics.record_validation_failure();

        let stats = metrics.get_stats();
        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.rejected_validation, 1);
        assert_eq!(stats.rejected_illegal, 0);
    }

    #[test]
    fn durations_add_up() {
        let metrics = WorkflowMetrics::new();
        metrics.record_duration(Duration::from_micros(250));
        metrics.record_duration(OperationTimer::new("noop").finish());

        let stats = metrics.get_stats();
        assert_eq!(stats.timed, 2);
        assert!(stats.total_duration_us >= 250);
    }
}
