//! Run-scoped progress state: current stage label, percent complete, and an
//! append-only log buffer.
//!
//! Single-writer (the run that owns it), best-effort readable by pollers —
//! stale reads are fine. Progress is monotonically non-decreasing within a
//! run; only `reset` (the start of a new run) moves it back to zero.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use pressroom_common::Severity;

#[derive(Debug, Default)]
struct RunStateInner {
    stage: String,
    progress: u8,
    logs: Vec<String>,
}

/// Cloneable handle to the shared run state.
#[derive(Clone, Default)]
pub struct RunHandle {
    inner: Arc<RwLock<RunStateInner>>,
}

/// Point-in-time copy for the polling contract.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub stage: String,
    pub progress: u8,
    pub logs: Vec<String>,
}

impl RunHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run: clear logs, zero progress.
    pub fn reset(&self) {
        let mut state = self.inner.write().unwrap();
        state.stage = "Starting...".to_string();
        state.progress = 0;
        state.logs.clear();
    }

    /// Advance to a new stage. Progress never moves backwards mid-run.
    pub fn set_stage(&self, label: &str, progress: u8) {
        let mut state = self.inner.write().unwrap();
        state.stage = label.to_string();
        state.progress = state.progress.max(progress.min(100));
    }

    /// Replace the stage label without touching progress (error reporting).
    pub fn set_label(&self, label: &str) {
        self.inner.write().unwrap().stage = label.to_string();
    }

    /// Append a timestamped log line, mirrored to tracing.
    pub fn log(&self, message: &str, severity: Severity) {
        let line = format!("[{}] [{severity}] {message}", Utc::now().format("%H:%M:%S"));
        self.inner.write().unwrap().logs.push(line);
        match severity {
            Severity::Error => error!("{message}"),
            Severity::Warning => warn!("{message}"),
            _ => info!("{message}"),
        }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let state = self.inner.read().unwrap();
        RunSnapshot {
            stage: state.stage.clone(),
            progress: state.progress,
            logs: state.logs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_within_a_run() {
        let handle = RunHandle::new();
        handle.reset();
        handle.set_stage("a", 40);
        handle.set_stage("b", 25);
        assert_eq!(handle.snapshot().progress, 40);
        handle.set_stage("c", 90);
        assert_eq!(handle.snapshot().progress, 90);
    }

    #[test]
    fn reset_starts_a_fresh_run() {
        let handle = RunHandle::new();
        handle.set_stage("a", 80);
        handle.log("first run", Severity::Info);
        handle.reset();
        let snap = handle.snapshot();
        assert_eq!(snap.progress, 0);
        assert!(snap.logs.is_empty());
    }

    #[test]
    fn logs_append_in_order() {
        let handle = RunHandle::new();
        handle.log("one", Severity::Info);
        handle.log("two", Severity::Warning);
        let snap = handle.snapshot();
        assert_eq!(snap.logs.len(), 2);
        assert!(snap.logs[0].contains("one"));
        assert!(snap.logs[1].contains("[WARNING] two"));
    }
}
