// tests/watch_core.rs

use std::path::PathBuf;

use sitepipe::engine::{
    RebuildOutcome, TriggerWhileRunningBehaviour, WatchCommand, WatchCore, WatchEvent,
    WatchOptions, WatchState,
};
use sitepipe::task::Failure;

fn changed(path: &str) -> WatchEvent {
    WatchEvent::FilesChanged {
        paths: vec![PathBuf::from(path)],
    }
}

fn finished(run_id: u64) -> WatchEvent {
    WatchEvent::RebuildFinished {
        run_id,
        outcome: RebuildOutcome::Success,
    }
}

fn core(behaviour: TriggerWhileRunningBehaviour) -> WatchCore {
    WatchCore::new(behaviour, WatchOptions::default())
}

#[test]
fn change_while_idle_starts_a_rebuild() {
    let mut core = core(TriggerWhileRunningBehaviour::Queue);
    assert_eq!(core.state(), WatchState::Idle);

    let step = core.step(changed("src/css/main.css"));

    assert_eq!(step.commands, vec![WatchCommand::StartRebuild { run_id: 1 }]);
    assert!(step.keep_running);
    assert_eq!(core.state(), WatchState::Running);
}

#[test]
fn changes_during_a_rebuild_coalesce_into_one_rerun() {
    let mut core = core(TriggerWhileRunningBehaviour::Queue);

    core.step(changed("src/css/a.css"));
    for path in ["src/css/b.css", "src/js/app.js", "_layouts/default.html"] {
        let step = core.step(changed(path));
        assert!(step.commands.is_empty());
        assert_eq!(core.state(), WatchState::PendingRerun);
    }

    let step = core.step(finished(1));
    assert_eq!(step.commands, vec![WatchCommand::StartRebuild { run_id: 2 }]);
    assert_eq!(core.state(), WatchState::Running);

    let step = core.step(finished(2));
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), WatchState::Idle);
    assert_eq!(core.rebuilds_started(), 2);
}

#[test]
fn drop_policy_discards_changes_during_a_rebuild() {
    let mut core = core(TriggerWhileRunningBehaviour::Drop);

    core.step(changed("src/css/a.css"));
    let step = core.step(changed("src/css/b.css"));
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), WatchState::Running);

    let step = core.step(finished(1));
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), WatchState::Idle);
    assert_eq!(core.rebuilds_started(), 1);
}

#[test]
fn failed_rebuild_returns_to_idle_and_keeps_watching() {
    let mut core = core(TriggerWhileRunningBehaviour::Queue);
    core.step(changed("src/css/a.css"));

    let step = core.step(WatchEvent::RebuildFinished {
        run_id: 1,
        outcome: RebuildOutcome::Failed {
            failures: vec![Failure::syntax("compile-styles", "bad")],
        },
    });

    assert!(step.keep_running);
    assert_eq!(core.state(), WatchState::Idle);
    assert_eq!(core.rebuilds_failed(), 1);

    // Next change rebuilds again.
    let step = core.step(changed("src/css/a.css"));
    assert_eq!(step.commands, vec![WatchCommand::StartRebuild { run_id: 2 }]);
}

#[test]
fn stale_completion_is_ignored() {
    let mut core = core(TriggerWhileRunningBehaviour::Queue);

    // Completion while idle.
    let step = core.step(finished(7));
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), WatchState::Idle);

    // Completion for a run that is not the current one.
    core.step(changed("src/css/a.css"));
    core.step(changed("src/css/b.css"));
    let step = core.step(finished(42));
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), WatchState::PendingRerun);
}

#[test]
fn shutdown_stops_the_loop_from_any_state() {
    let mut idle = core(TriggerWhileRunningBehaviour::Queue);
    assert!(!idle.step(WatchEvent::ShutdownRequested).keep_running);

    let mut running = core(TriggerWhileRunningBehaviour::Queue);
    running.step(changed("src/css/a.css"));
    let step = running.step(WatchEvent::ShutdownRequested);
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}

#[test]
fn exit_when_idle_stops_after_the_last_rebuild() {
    let mut core = WatchCore::new(
        TriggerWhileRunningBehaviour::Queue,
        WatchOptions {
            exit_when_idle: true,
        },
    );

    core.step(changed("src/css/a.css"));
    core.step(changed("src/css/b.css"));

    // A rerun is pending, so the loop keeps going.
    assert!(core.step(finished(1)).keep_running);
    assert!(!core.step(finished(2)).keep_running);
}
