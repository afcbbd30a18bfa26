mod batch;
mod task;

pub use batch::{BatchCoordinator, RunSummary, TaskFailure};
pub use task::{CancelFlag, StepFn, Task, TaskOutcome, TaskRunner, TaskState, TaskStep};
