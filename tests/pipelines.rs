// tests/pipelines.rs

mod common;
use crate::common::{ConfigFileBuilder, EventLog, FakeDevServer, FakeTask, init_tracing, registry_of, watch_runner, with_timeout};

use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sitepipe::errors::SitepipeError;
use sitepipe::notifier::FailureNotifier;
use sitepipe::pipeline::definitions::{full_build, rebuild};
use sitepipe::pipeline::node::{leaf, parallel, sequence};
use sitepipe::pipeline::{Node, Pipeline, PipelineName, validate_pipeline};
use sitepipe::task::names;
use sitepipe::types::RunMode;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn full_build_cleans_then_compiles_in_parallel_then_generates() {
    let expected = sequence([
        leaf(names::CLEAN),
        parallel([
            leaf(names::COMPILE_STYLES),
            leaf(names::COMPILE_SCRIPTS),
            leaf(names::COPY_ICONS),
            leaf(names::BUILD_SPRITE_SHEET),
        ]),
        leaf(names::RUN_SITE_GENERATOR),
    ]);
    assert_eq!(full_build(), expected);
    assert_eq!(Pipeline::named(PipelineName::FullBuild).root, expected);
}

#[test]
fn default_is_the_dev_pipeline() {
    let dev = Pipeline::named(PipelineName::Dev);
    let default = Pipeline::named(PipelineName::Default);
    assert_eq!(default.root, dev.root);

    let Node::Sequence(steps) = &dev.root else {
        panic!("dev should be a sequence, got {:?}", dev.root);
    };
    assert_eq!(steps[0], full_build());
    assert_eq!(steps[1], leaf(names::START_DEV_SERVER));
    assert_eq!(steps[2], leaf(names::WATCH));
}

#[test]
fn deploy_never_serves_or_watches() {
    let deploy = Pipeline::named(PipelineName::Deploy);
    let leaves = deploy.root.leaves();
    assert!(!leaves.contains(&names::START_DEV_SERVER));
    assert!(!leaves.contains(&names::WATCH));
    assert_eq!(deploy.root, full_build());
}

#[test]
fn single_asset_pipelines_are_single_leaves() {
    assert_eq!(Pipeline::named(PipelineName::StylesOnly).root, leaf(names::COMPILE_STYLES));
    assert_eq!(Pipeline::named(PipelineName::ScriptsOnly).root, leaf(names::COMPILE_SCRIPTS));
    assert_eq!(Pipeline::named(PipelineName::IconsOnly).root, leaf(names::COPY_ICONS));
    assert_eq!(Pipeline::named(PipelineName::SiteOnly).root, leaf(names::RUN_SITE_GENERATOR));
}

#[test]
fn rebuild_reloads_after_the_full_build() {
    assert_eq!(rebuild(), sequence([full_build(), leaf(names::RELOAD_DEV_SERVER)]));
}

#[test]
fn pipeline_names_parse_and_unknown_names_are_rejected() {
    for name in PipelineName::ALL {
        assert_eq!(PipelineName::from_str(name.as_str()).unwrap(), name);
    }

    match PipelineName::from_str("release") {
        Err(SitepipeError::UnknownPipeline(name)) => assert_eq!(name, "release"),
        other => panic!("expected UnknownPipeline, got {other:?}"),
    }
}

#[test]
fn every_named_pipeline_validates_against_the_real_registry() -> TestResult {
    let dir = tempfile::tempdir()?;
    let layout = ConfigFileBuilder::new().layout(dir.path());
    let registry = sitepipe::build_full_registry(
        &layout,
        Arc::new(FakeDevServer::new()),
        Arc::new(FailureNotifier::new(RunMode::Watch)),
    );

    for pipeline in Pipeline::all() {
        validate_pipeline(&pipeline.root, &registry)?;
    }
    validate_pipeline(&rebuild(), &registry)?;
    Ok(())
}

#[test]
fn clean_inside_a_parallel_group_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let layout = ConfigFileBuilder::new().layout(dir.path());
    let registry = sitepipe::build_registry(&layout, Arc::new(FakeDevServer::new()));

    let tree = parallel([leaf(names::CLEAN), leaf(names::COMPILE_STYLES)]);
    match validate_pipeline(&tree, &registry) {
        Err(SitepipeError::OutputOverlap(msg)) => {
            assert!(msg.contains(names::CLEAN), "message: {msg}");
            assert!(msg.contains(names::COMPILE_STYLES), "message: {msg}");
        }
        other => panic!("expected OutputOverlap, got {other:?}"),
    }
    Ok(())
}

#[test]
fn nested_outputs_in_a_parallel_group_are_rejected() {
    let log = EventLog::new();
    let outer = FakeTask::new("outer", &log).with_output("out/site").into_arc();
    let inner = FakeTask::new("inner", &log).with_output("out/site/css").into_arc();
    let registry = registry_of(&[outer, inner]);

    let result = validate_pipeline(&parallel([leaf("outer"), leaf("inner")]), &registry);
    assert!(matches!(result, Err(SitepipeError::OutputOverlap(_))), "got {result:?}");

    // The same pair is fine one after the other.
    validate_pipeline(&sequence([leaf("outer"), leaf("inner")]), &registry).unwrap();
}

#[test]
fn unregistered_leaf_fails_validation() {
    let registry = registry_of(&[]);
    match validate_pipeline(&sequence([leaf("ghost")]), &registry) {
        Err(SitepipeError::UnknownTask(name)) => assert_eq!(name, "ghost"),
        other => panic!("expected UnknownTask, got {other:?}"),
    }
}

/// A full build where every leaf is a recording fake.
fn fake_full_build(log: &EventLog) -> Vec<Arc<FakeTask>> {
    [
        (names::CLEAN, 30),
        (names::COMPILE_STYLES, 20),
        (names::COMPILE_SCRIPTS, 5),
        (names::COPY_ICONS, 10),
        (names::BUILD_SPRITE_SHEET, 15),
        (names::RUN_SITE_GENERATOR, 0),
    ]
    .into_iter()
    .map(|(name, ms)| {
        FakeTask::new(name, log)
            .with_delay(Duration::from_millis(ms))
            .into_arc()
    })
    .collect()
}

#[tokio::test]
async fn full_build_orders_clean_compiles_and_site_generation() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let runner = watch_runner(&fake_full_build(&log));

    with_timeout(runner.run(full_build())).await?;

    let pos = |entry: &str| log.position(entry).unwrap_or_else(|| panic!("missing {entry}"));
    let clean_end = pos("end:clean");
    let site_start = pos("start:run-site-generator");

    for compile in [
        names::COMPILE_STYLES,
        names::COMPILE_SCRIPTS,
        names::COPY_ICONS,
        names::BUILD_SPRITE_SHEET,
    ] {
        assert!(clean_end < pos(&format!("start:{compile}")), "{:?}", log.entries());
        assert!(pos(&format!("end:{compile}")) < site_start, "{:?}", log.entries());
    }
    Ok(())
}

#[tokio::test]
async fn compile_failure_skips_site_generation() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let mut tasks = fake_full_build(&log);
    tasks[1] = FakeTask::new(names::COMPILE_STYLES, &log)
        .failing("unexpected token")
        .into_arc();
    let runner = watch_runner(&tasks);

    let err = with_timeout(runner.run(full_build())).await.expect_err("should fail");

    assert_eq!(err.failed_tasks(), vec![names::COMPILE_STYLES]);
    // Sibling compiles still ran to completion.
    assert!(log.position("end:compile-scripts").is_some());
    assert_eq!(tasks[5].calls(), 0);
    Ok(())
}
