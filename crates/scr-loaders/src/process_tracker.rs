//! Process tracking for batch runs
//! In-memory only; one entry per company

use crate::pipeline::{PipelineRun, RunState};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
  Running,
  Success,
  /// Finished with some statements missing
  CompletedWithErrors,
  Failed,
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
  pub process_name: String,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
  pub state: ProcessState,
  pub error_message: Option<String>,
  pub records_processed: Option<usize>,
}

/// In-memory process tracker, cheap to clone and share between tasks
#[derive(Clone, Default)]
pub struct ProcessTracker {
  processes: Arc<Mutex<Vec<ProcessInfo>>>,
}

impl ProcessTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn start(&self, process_name: &str) {
    let mut processes = self.processes.lock().await;
    processes.push(ProcessInfo {
      process_name: process_name.to_string(),
      start_time: Utc::now(),
      end_time: None,
      state: ProcessState::Running,
      error_message: None,
      records_processed: None,
    });
  }

  /// Close the running entry for `process_name` from a finished run
  pub async fn finish(&self, process_name: &str, run: &PipelineRun) {
    let (state, error_message, records) = match (run.state(), run.output()) {
      (RunState::Complete, Some(output)) if output.manifest.is_partial() => {
        let missing: Vec<String> =
          output.manifest.missing.iter().map(|(s, e)| format!("{}: {}", s, e)).collect();
        (ProcessState::CompletedWithErrors, Some(missing.join("; ")), Some(output.records.len()))
      }
      (RunState::Complete, Some(output)) => (ProcessState::Success, None, Some(output.records.len())),
      (RunState::Failed(reason), _) => (ProcessState::Failed, Some(reason.to_string()), None),
      (other, _) => (ProcessState::Failed, Some(format!("run stopped while {}", other)), None),
    };

    let mut processes = self.processes.lock().await;
    if let Some(entry) = processes
      .iter_mut()
      .rev()
      .find(|p| p.process_name == process_name && p.state == ProcessState::Running)
    {
      entry.state = state;
      entry.end_time = Some(Utc::now());
      entry.error_message = error_message;
      entry.records_processed = records;
    }
  }

  pub async fn get_all(&self) -> Vec<ProcessInfo> {
    self.processes.lock().await.clone()
  }

  /// Number of entries in each state: (success, with errors, failed, running)
  pub async fn summary(&self) -> (usize, usize, usize, usize) {
    let processes = self.processes.lock().await;
    let count = |state: ProcessState| processes.iter().filter(|p| p.state == state).count();
    (
      count(ProcessState::Success),
      count(ProcessState::CompletedWithErrors),
      count(ProcessState::Failed),
      count(ProcessState::Running),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_start_records_running_entry() {
    let tracker = ProcessTracker::new();
    tracker.start("Infosys").await;
    tracker.start("TCS").await;

    let all = tracker.get_all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].process_name, "Infosys");
    assert_eq!(all[0].state, ProcessState::Running);
    assert!(all[0].end_time.is_none());
    assert_eq!(tracker.summary().await, (0, 0, 0, 2));
  }

  #[tokio::test]
  async fn test_clones_share_state() {
    let tracker = ProcessTracker::new();
    let clone = tracker.clone();
    clone.start("HDFC Bank").await;
    assert_eq!(tracker.get_all().await.len(), 1);
  }
}
