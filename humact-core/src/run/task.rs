use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DiagnosticsSection, RetrySection};
use crate::interact::{InteractError, InteractResult, InteractionController};

pub type StepFn =
    Box<dyn for<'a> Fn(&'a mut InteractionController) -> LocalBoxFuture<'a, InteractResult<()>>>;

/// One fallible step of a task: a name for diagnostics and a closure over
/// the controller primitives.
pub struct TaskStep {
    pub name: String,
    run: StepFn,
}

impl std::fmt::Debug for TaskStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStep").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A complete logical workflow, executed step by step in order.
#[derive(Debug)]
pub struct Task {
    pub label: String,
    pub steps: Vec<TaskStep>,
}

impl Task {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a mut InteractionController) -> LocalBoxFuture<'a, InteractResult<()>>
            + 'static,
    {
        self.steps.push(TaskStep {
            name: name.into(),
            run: Box::new(run),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        }
    }
}

/// Terminal result of one task execution. Created exactly once per run
/// and immutable afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum TaskOutcome {
    Succeeded { attempts: usize },
    Failed { reason: String, attempts: usize },
    Aborted { reason: String },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded { .. })
    }
}

/// Cooperative cancellation handle. Checked between tasks and between
/// attempts only; an in-flight step always runs to completion or failure.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

/// Drives one task through `Pending -> Running -> {Succeeded, Failed}`
/// with a bounded retry budget. The only place retry decisions live.
pub struct TaskRunner {
    controller: InteractionController,
    retry: RetrySection,
    diagnostics: DiagnosticsSection,
    cancel: CancelFlag,
}

impl TaskRunner {
    pub fn new(
        controller: InteractionController,
        mut retry: RetrySection,
        diagnostics: DiagnosticsSection,
    ) -> Self {
        // A zero budget would mean never attempting at all.
        retry.max_attempts = retry.max_attempts.max(1);
        Self {
            controller,
            retry,
            diagnostics,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn into_controller(self) -> InteractionController {
        self.controller
    }

    pub async fn run(&mut self, task: &Task) -> TaskOutcome {
        let max_attempts = self.retry.max_attempts;
        info!(task = %task.label, state = TaskState::Running.as_str(), "task started");

        for attempt in 1..=max_attempts {
            match self.run_steps(task).await {
                Ok(()) => {
                    info!(
                        task = %task.label,
                        state = TaskState::Succeeded.as_str(),
                        attempts = attempt,
                        "task finished"
                    );
                    return TaskOutcome::Succeeded { attempts: attempt };
                }
                Err(err) if !err.is_retryable() => {
                    warn!(task = %task.label, error = %err, "task aborted on fatal error");
                    return TaskOutcome::Aborted {
                        reason: err.to_string(),
                    };
                }
                Err(err) => {
                    warn!(
                        task = %task.label,
                        attempt,
                        max_attempts,
                        error = %err,
                        "task attempt failed"
                    );
                    if attempt >= max_attempts {
                        self.capture_failure(&task.label).await;
                        info!(
                            task = %task.label,
                            state = TaskState::Failed.as_str(),
                            attempts = attempt,
                            "task finished"
                        );
                        return TaskOutcome::Failed {
                            reason: err.to_string(),
                            attempts: attempt,
                        };
                    }
                    if self.cancel.is_cancelled() {
                        return TaskOutcome::Aborted {
                            reason: "cancelled between attempts".into(),
                        };
                    }
                    if let Err(err) = self.controller.wait("retry_backoff").await {
                        // Backoff category missing is a configuration bug.
                        return TaskOutcome::Aborted {
                            reason: err.to_string(),
                        };
                    }
                }
            }
        }

        unreachable!("retry loop always returns an outcome")
    }

    async fn run_steps(&mut self, task: &Task) -> InteractResult<()> {
        for step in &task.steps {
            debug!(task = %task.label, step = %step.name, "running step");
            (step.run)(&mut self.controller).await.map_err(|err| {
                debug!(task = %task.label, step = %step.name, error = %err, "step failed");
                err
            })?;
        }
        Ok(())
    }

    /// Best-effort screenshot on retry exhaustion. Never changes the
    /// outcome, even when the capture itself fails.
    async fn capture_failure(&mut self, label: &str) {
        let Some(dir) = self.diagnostics.screenshot_dir.clone() else {
            return;
        };
        if let Err(err) = std::fs::create_dir_all(&dir) {
            warn!(error = %err, "could not create screenshot directory");
            return;
        }
        let slug: String = label
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
            .collect();
        let path = dir.join(format!("error_{slug}.png"));
        match self.controller.capture_png(&path).await {
            Ok(()) => info!(path = %path.display(), "failure screenshot captured"),
            Err(err) => warn!(error = %err, "failure screenshot capture failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = TaskOutcome::Failed {
            reason: "gone".into(),
            attempts: 3,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["attempts"], 3);
    }

    #[test]
    fn cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());
        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
