// tests/notifier.rs

mod common;
use crate::common::{ExitRecorder, init_tracing};

use sitepipe::notifier::{Disposition, format_diagnostic};
use sitepipe::task::{Failure, FailureKind};
use sitepipe::types::RunMode;

fn css_failure() -> Failure {
    Failure::syntax("compile-styles", "Unexpected token Delim('.')")
        .at_file("src/css/main.css")
        .at_location(3, 7)
}

#[test]
fn watch_mode_reports_and_continues() {
    init_tracing();

    let exits = ExitRecorder::default();
    let notifier = exits.notifier(RunMode::Watch);

    assert_eq!(notifier.notify(&css_failure()), Disposition::Continue);
    assert_eq!(notifier.notify(&css_failure()), Disposition::Continue);

    assert_eq!(notifier.reported(), 2);
    assert_eq!(exits.calls(), 0);
}

#[test]
fn one_shot_mode_reports_then_exits_with_status_one() {
    init_tracing();

    let exits = ExitRecorder::default();
    let notifier = exits.notifier(RunMode::OneShot);

    assert_eq!(notifier.notify(&css_failure()), Disposition::Terminate);
    assert_eq!(notifier.reported(), 1);
    assert_eq!(exits.calls(), 1);
}

#[test]
fn mode_is_fixed_at_construction() {
    let exits = ExitRecorder::default();
    assert_eq!(exits.notifier(RunMode::Watch).mode(), RunMode::Watch);
    assert_eq!(exits.notifier(RunMode::OneShot).mode(), RunMode::OneShot);
}

#[test]
fn diagnostic_banner_shows_location_kind_task_and_message() {
    let banner = format_diagnostic(&css_failure());

    assert!(banner.contains(&"*".repeat(50)));
    assert!(banner.contains("src/css/main.css - 3:7."), "{banner}");
    assert!(banner.contains("SyntaxError in compile-styles"), "{banner}");
    assert!(banner.contains("Unexpected token Delim('.')"), "{banner}");
}

#[test]
fn diagnostic_banner_marks_unknown_location() {
    let failure = Failure::process_exit("run-site-generator", 2, "jekyll exited");
    assert_eq!(failure.kind, FailureKind::ProcessExit { code: 2 });

    let banner = format_diagnostic(&failure);
    assert!(banner.contains("? - ?:?."), "{banner}");
    assert!(banner.contains("ProcessExitError (exit code 2) in run-site-generator"), "{banner}");
}

#[test]
fn failure_display_includes_location_when_known() {
    assert_eq!(
        css_failure().to_string(),
        "compile-styles: Unexpected token Delim('.') (src/css/main.css:3:7)"
    );
    assert_eq!(
        Failure::io("clean", "permission denied").to_string(),
        "clean: permission denied"
    );
}
