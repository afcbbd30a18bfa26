mod common;

use common::{controller, MockDriver};

use humact_core::{BatchCoordinator, InteractError, Task, TaskRunner};

fn coordinator(driver: MockDriver) -> BatchCoordinator {
    let config = common::test_config();
    let runner = TaskRunner::new(controller(driver), config.retry, config.diagnostics);
    BatchCoordinator::new(runner)
}

fn passing_task(label: &str, key: &'static str) -> Task {
    Task::new(label).step("press", move |ctl| {
        Box::pin(async move { ctl.press_key(key).await })
    })
}

fn failing_task(label: &str) -> Task {
    Task::new(label).step("press", |_ctl| {
        Box::pin(async { Err(InteractError::ElementNotFound("button".into())) })
    })
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let (driver, journal) = MockDriver::new();
    let mut batch = coordinator(driver);

    let tasks = vec![
        passing_task("first", "1"),
        failing_task("second"),
        passing_task("third", "3"),
    ];

    let summary = batch.run(&tasks).await;
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].label, "second");
    assert!(summary.completed_at.is_some());

    // The third task really ran after the failure.
    assert!(journal.borrow().iter().any(|e| e == "key:3"));
}

#[tokio::test]
async fn empty_batch_completes_immediately() {
    let (driver, _journal) = MockDriver::new();
    let mut batch = coordinator(driver);

    let summary = batch.run(&[]).await;
    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert!(summary.completed_at.is_some());
}

#[tokio::test]
async fn cancellation_skips_the_remaining_tasks() {
    let (driver, journal) = MockDriver::new();
    let mut batch = coordinator(driver);
    let cancel = batch.cancel_flag();

    let first = Task::new("first").step("press then cancel", move |ctl| {
        let cancel = cancel.clone();
        Box::pin(async move {
            ctl.press_key("1").await?;
            cancel.cancel();
            Ok(())
        })
    });

    let tasks = vec![first, passing_task("second", "2")];
    let summary = batch.run(&tasks).await;

    // The in-flight task finishes; the next one never starts.
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!journal.borrow().iter().any(|e| e == "key:2"));
}

#[tokio::test]
async fn aborted_task_stops_the_batch_and_is_recorded() {
    let (driver, journal) = MockDriver::new();
    let mut batch = coordinator(driver);

    let broken = Task::new("broken").step("wait", |ctl| {
        Box::pin(async move { ctl.wait("no_such_category").await })
    });

    let tasks = vec![broken, passing_task("after", "9")];
    let summary = batch.run(&tasks).await;

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].label, "broken");
    assert!(!journal.borrow().iter().any(|e| e == "key:9"));
}
