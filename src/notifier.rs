// src/notifier.rs

//! Failure notifier.
//!
//! Every leaf failure is reported here exactly once. Reporting means a
//! structured `tracing` event, a terminal bell and a banner diagnostic on
//! stderr. What happens next depends on the [`RunMode`] fixed at
//! construction:
//!
//! - `Watch`: the failure is absorbed and the process keeps running; the
//!   failing pipeline still reports failure upward.
//! - `OneShot`: the exit hook is called with status 1. In production the hook
//!   is `std::process::exit`, so the process ends right after reporting.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::error;

use crate::task::Failure;
use crate::types::RunMode;

/// What the notifier decided for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Terminate,
}

type ExitHook = Box<dyn Fn(i32) + Send + Sync>;

pub struct FailureNotifier {
    mode: RunMode,
    exit: ExitHook,
    reported: AtomicUsize,
}

impl fmt::Debug for FailureNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureNotifier")
            .field("mode", &self.mode)
            .field("reported", &self.reported())
            .finish_non_exhaustive()
    }
}

impl FailureNotifier {
    pub fn new(mode: RunMode) -> Self {
        Self::with_exit_hook(mode, |code| {
            std::process::exit(code);
        })
    }

    /// Use `hook` instead of `std::process::exit` for one-shot termination.
    pub fn with_exit_hook(mode: RunMode, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self {
            mode,
            exit: Box::new(hook),
            reported: AtomicUsize::new(0),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Number of failures reported so far.
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::SeqCst)
    }

    pub fn notify(&self, failure: &Failure) -> Disposition {
        self.reported.fetch_add(1, Ordering::SeqCst);

        error!(
            task = %failure.task,
            kind = %failure.kind,
            file = ?failure.file,
            line = ?failure.line,
            col = ?failure.col,
            "{}",
            failure.message
        );

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\x07{}", format_diagnostic(failure));
        let _ = stderr.flush();
        drop(stderr);

        match self.mode {
            RunMode::Watch => Disposition::Continue,
            RunMode::OneShot => {
                (self.exit)(1);
                Disposition::Terminate
            }
        }
    }
}

/// Banner printed for a failure. Unknown location parts render as `?`.
pub fn format_diagnostic(failure: &Failure) -> String {
    let rule = "*".repeat(50);
    let file = failure
        .file
        .as_ref()
        .map(|f| f.display().to_string())
        .unwrap_or_else(|| "?".to_string());
    let line = failure.line.map_or_else(|| "?".to_string(), |l| l.to_string());
    let col = failure.col.map_or_else(|| "?".to_string(), |c| c.to_string());

    format!(
        "\n{rule}\n    {file} - {line}:{col}.\n    {dashes}\n    {kind} in {task}\n    {message}\n{rule}\n",
        dashes = "-".repeat(30),
        kind = failure.kind,
        task = failure.task,
        message = failure.message,
    )
}
