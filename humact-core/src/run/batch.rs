use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interact::InteractionController;

use super::task::{CancelFlag, Task, TaskOutcome, TaskRunner};

#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub label: String,
    pub reason: String,
}

/// Aggregate result of a batch. Appended to only by the coordinator,
/// read-only for everyone else.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }
}

/// Runs tasks strictly one after another with an inter-task cooldown.
/// One failed task never stops the batch; the run always completes with
/// a summary.
pub struct BatchCoordinator {
    runner: TaskRunner,
    cancel: CancelFlag,
}

impl BatchCoordinator {
    pub fn new(runner: TaskRunner) -> Self {
        let cancel = CancelFlag::new();
        Self {
            runner: runner.with_cancel(cancel.clone()),
            cancel,
        }
    }

    /// Handle the caller keeps to request cancellation between tasks.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn into_controller(self) -> InteractionController {
        self.runner.into_controller()
    }

    pub async fn run(&mut self, tasks: &[Task]) -> RunSummary {
        let mut summary = RunSummary::new();
        info!(run_id = %summary.run_id, tasks = tasks.len(), "batch started");

        for (index, task) in tasks.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(run_id = %summary.run_id, remaining = tasks.len() - index, "batch cancelled");
                break;
            }

            summary.attempted += 1;
            let outcome = self.runner.run(task).await;
            let stop = self.record(&mut summary, &task.label, outcome);
            if stop {
                break;
            }

            if index + 1 < tasks.len() {
                if let Err(err) = self.runner.controller_mut().wait("between_tasks").await {
                    warn!(error = %err, "inter-task cooldown unavailable, stopping batch");
                    break;
                }
            }
        }

        summary.completed_at = Some(Utc::now());
        info!(
            run_id = %summary.run_id,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch finished"
        );
        summary
    }

    /// Returns true when the batch must stop (configuration bug or
    /// cancellation surfaced as an aborted task).
    fn record(&self, summary: &mut RunSummary, label: &str, outcome: TaskOutcome) -> bool {
        match outcome {
            TaskOutcome::Succeeded { .. } => {
                summary.succeeded += 1;
                false
            }
            TaskOutcome::Failed { reason, .. } => {
                summary.failed += 1;
                summary.failures.push(TaskFailure {
                    label: label.to_string(),
                    reason,
                });
                false
            }
            TaskOutcome::Aborted { reason } => {
                summary.failed += 1;
                summary.failures.push(TaskFailure {
                    label: label.to_string(),
                    reason,
                });
                true
            }
        }
    }
}
