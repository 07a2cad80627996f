// tests/combinators.rs

mod common;
use crate::common::{EventLog, ExitRecorder, FakeTask, init_tracing, registry_of, watch_runner, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use sitepipe::pipeline::node::{leaf, parallel, sequence};
use sitepipe::pipeline::PipelineRunner;
use sitepipe::task::FailureKind;
use sitepipe::types::RunMode;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn sequence_runs_children_in_order() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let a = FakeTask::new("a", &log).with_delay(Duration::from_millis(20)).into_arc();
    let b = FakeTask::new("b", &log).into_arc();
    let c = FakeTask::new("c", &log).into_arc();
    let runner = watch_runner(&[a, b, c]);

    with_timeout(runner.run(sequence([leaf("a"), leaf("b"), leaf("c")]))).await?;

    assert_eq!(
        log.entries(),
        vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
    );
    Ok(())
}

#[tokio::test]
async fn sequence_stops_at_first_failure() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let a = FakeTask::new("a", &log).into_arc();
    let b = FakeTask::new("b", &log).failing("boom").into_arc();
    let c = FakeTask::new("c", &log).into_arc();
    let runner = watch_runner(&[a.clone(), b.clone(), c.clone()]);

    let err = with_timeout(runner.run(sequence([leaf("a"), leaf("b"), leaf("c")])))
        .await
        .expect_err("sequence should fail");

    assert_eq!(err.failed_tasks(), vec!["b"]);
    assert_eq!(err.failures[0].message, "boom");
    assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));
    assert_eq!(runner.notifier().reported(), 1);
    Ok(())
}

#[tokio::test]
async fn parallel_starts_every_member_before_any_finishes() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let tasks: Vec<_> = ["x", "y", "z"]
        .iter()
        .map(|n| FakeTask::new(n, &log).with_delay(Duration::from_millis(50)).into_arc())
        .collect();
    let runner = watch_runner(&tasks);

    with_timeout(runner.run(parallel([leaf("x"), leaf("y"), leaf("z")]))).await?;

    let entries = log.entries();
    let first_end = entries
        .iter()
        .position(|e| e.starts_with("end:"))
        .expect("some task finished");
    let starts_before_end = entries[..first_end]
        .iter()
        .filter(|e| e.starts_with("start:"))
        .count();
    assert_eq!(starts_before_end, 3, "log was {entries:?}");
    Ok(())
}

#[tokio::test]
async fn parallel_waits_for_every_member_and_reports_all_failures() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let slow = FakeTask::new("slow", &log).with_delay(Duration::from_millis(80)).into_arc();
    let first = FakeTask::new("first", &log).failing("first broke").into_arc();
    let second = FakeTask::new("second", &log)
        .with_delay(Duration::from_millis(10))
        .failing("second broke")
        .into_arc();
    let runner = watch_runner(&[slow.clone(), first, second]);

    let err = with_timeout(runner.run(parallel([leaf("first"), leaf("slow"), leaf("second")])))
        .await
        .expect_err("group should fail");

    // Declaration order, not completion order.
    assert_eq!(err.failed_tasks(), vec!["first", "second"]);
    // The failing siblings did not cut the slow member short.
    assert!(log.position("end:slow").is_some());
    assert_eq!(slow.calls(), 1);
    assert_eq!(runner.notifier().reported(), 2);
    Ok(())
}

#[tokio::test]
async fn empty_groups_succeed_immediately() -> TestResult {
    init_tracing();

    let runner = watch_runner(&[]);
    with_timeout(runner.run(sequence([]))).await?;
    with_timeout(runner.run(parallel([]))).await?;
    with_timeout(runner.run(sequence([parallel([]), sequence([])]))).await?;
    Ok(())
}

#[tokio::test]
async fn nested_failure_propagates_through_enclosing_sequence() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let styles = FakeTask::new("styles", &log).failing("bad css").into_arc();
    let scripts = FakeTask::new("scripts", &log).into_arc();
    let site = FakeTask::new("site", &log).into_arc();
    let runner = watch_runner(&[styles, scripts.clone(), site.clone()]);

    let tree = sequence([parallel([leaf("styles"), leaf("scripts")]), leaf("site")]);
    let err = with_timeout(runner.run(tree)).await.expect_err("should fail");

    assert_eq!(err.failed_tasks(), vec!["styles"]);
    assert_eq!(scripts.calls(), 1);
    assert_eq!(site.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn unregistered_leaf_is_reported_as_a_failure() -> TestResult {
    init_tracing();

    let runner = watch_runner(&[]);
    let err = with_timeout(runner.run(leaf("missing"))).await.expect_err("should fail");

    assert_eq!(err.failed_tasks(), vec!["missing"]);
    assert_eq!(err.failures[0].kind, FailureKind::Io);
    assert_eq!(runner.notifier().reported(), 1);
    Ok(())
}

#[tokio::test]
async fn one_shot_runner_calls_exit_hook_on_leaf_failure() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let bad = FakeTask::new("bad", &log).failing("nope").into_arc();
    let exits = ExitRecorder::default();
    let runner = PipelineRunner::new(registry_of(&[bad]), exits.notifier(RunMode::OneShot));

    let result = with_timeout(runner.run(leaf("bad"))).await;

    assert!(result.is_err());
    assert_eq!(exits.calls(), 1);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any sequence with a failing member, exactly the members up to and
    /// including the first failure run.
    #[test]
    fn sequence_short_circuits_at_first_failure(
        len in 1..8usize,
        failing in proptest::collection::vec(any::<bool>(), 8),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        let log = EventLog::new();
        let tasks: Vec<Arc<FakeTask>> = (0..len)
            .map(|i| {
                let task = FakeTask::new(&format!("t{i}"), &log);
                let task = if failing[i] { task.failing("fail") } else { task };
                task.into_arc()
            })
            .collect();
        let runner = watch_runner(&tasks);
        let tree = sequence((0..len).map(|i| leaf(format!("t{i}"))));

        let result = rt.block_on(runner.run(tree));

        let first_failure = (0..len).find(|&i| failing[i]);
        match first_failure {
            Some(stop) => {
                let err = result.expect_err("sequence with a failing member fails");
                let expected = format!("t{stop}");
                prop_assert_eq!(err.failed_tasks(), vec![expected.as_str()]);
                for (i, task) in tasks.iter().enumerate() {
                    prop_assert_eq!(task.calls(), usize::from(i <= stop));
                }
            }
            None => {
                prop_assert!(result.is_ok());
                for task in &tasks {
                    prop_assert_eq!(task.calls(), 1);
                }
            }
        }
    }
}
