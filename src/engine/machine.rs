// src/engine/machine.rs

//! Pure watch-loop state machine.
//!
//! Transitions:
//!
//! | state          | event            | next                                  |
//! |----------------|------------------|---------------------------------------|
//! | `Idle`         | files changed    | `Running` (start rebuild)             |
//! | `Running`      | files changed    | `PendingRerun` (`queue`) / `Running` (`drop`) |
//! | `PendingRerun` | files changed    | `PendingRerun` (coalesced)            |
//! | `Running`      | rebuild finished | `Idle`                                |
//! | `PendingRerun` | rebuild finished | `Running` (start one fresh rebuild)   |
//!
//! A failed rebuild is handled exactly like a successful one here; the
//! failure has already been reported by the notifier.

use tracing::{debug, info, warn};

use crate::types::TriggerWhileRunningBehaviour;

use super::{RebuildOutcome, RunId, WatchEvent, WatchOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Running,
    PendingRerun,
}

/// Command produced by the core, to be executed by the async shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    StartRebuild { run_id: RunId },
}

/// Decision returned by the core after handling a single `WatchEvent`.
#[derive(Debug, Clone)]
pub struct WatchStep {
    pub commands: Vec<WatchCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl WatchStep {
    fn none() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    fn start(run_id: RunId) -> Self {
        Self {
            commands: vec![WatchCommand::StartRebuild { run_id }],
            keep_running: true,
        }
    }

    fn stop() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: false,
        }
    }
}

#[derive(Debug)]
pub struct WatchCore {
    state: WatchState,
    behaviour: TriggerWhileRunningBehaviour,
    options: WatchOptions,
    current_run: RunId,
    rebuilds_started: u64,
    rebuilds_failed: u64,
}

impl WatchCore {
    pub fn new(behaviour: TriggerWhileRunningBehaviour, options: WatchOptions) -> Self {
        Self {
            state: WatchState::Idle,
            behaviour,
            options,
            current_run: 0,
            rebuilds_started: 0,
            rebuilds_failed: 0,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn rebuilds_started(&self) -> u64 {
        self.rebuilds_started
    }

    pub fn rebuilds_failed(&self) -> u64 {
        self.rebuilds_failed
    }

    pub fn step(&mut self, event: WatchEvent) -> WatchStep {
        match event {
            WatchEvent::FilesChanged { paths } => self.handle_change(paths.len()),
            WatchEvent::RebuildFinished { run_id, outcome } => self.handle_finished(run_id, outcome),
            WatchEvent::ShutdownRequested => {
                info!(state = ?self.state, "shutdown requested");
                WatchStep::stop()
            }
        }
    }

    fn handle_change(&mut self, changed: usize) -> WatchStep {
        match self.state {
            WatchState::Idle => {
                info!(changed, "change detected; starting rebuild");
                self.start_rebuild()
            }
            WatchState::Running => match self.behaviour {
                TriggerWhileRunningBehaviour::Queue => {
                    debug!(changed, run_id = self.current_run, "rebuild running; queueing one rerun");
                    self.state = WatchState::PendingRerun;
                    WatchStep::none()
                }
                TriggerWhileRunningBehaviour::Drop => {
                    debug!(changed, run_id = self.current_run, "rebuild running; dropping change");
                    WatchStep::none()
                }
            },
            WatchState::PendingRerun => {
                debug!(changed, "rerun already queued; coalescing change");
                WatchStep::none()
            }
        }
    }

    fn handle_finished(&mut self, run_id: RunId, outcome: RebuildOutcome) -> WatchStep {
        if self.state == WatchState::Idle || run_id != self.current_run {
            warn!(
                run_id,
                current = self.current_run,
                "ignoring completion of a rebuild that is not running"
            );
            return WatchStep::none();
        }

        match &outcome {
            RebuildOutcome::Success => info!(run_id, "rebuild succeeded"),
            RebuildOutcome::Failed { failures } => {
                self.rebuilds_failed += 1;
                warn!(
                    run_id,
                    failures = failures.len(),
                    "rebuild failed; still watching"
                );
            }
        }

        match self.state {
            WatchState::PendingRerun => {
                info!("changes arrived during rebuild; rebuilding again");
                self.start_rebuild()
            }
            _ => {
                self.state = WatchState::Idle;
                if self.options.exit_when_idle {
                    info!("idle with nothing pending; stopping");
                    return WatchStep::stop();
                }
                WatchStep::none()
            }
        }
    }

    fn start_rebuild(&mut self) -> WatchStep {
        self.current_run += 1;
        self.rebuilds_started += 1;
        self.state = WatchState::Running;
        WatchStep::start(self.current_run)
    }
}
