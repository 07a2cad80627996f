// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::assets::{OutputSnapshot, run_blocking};
use crate::errors::Result;
use crate::pipeline::{Node, PipelineRunner};
use crate::task::names;

use super::machine::WatchCore;
use super::{RebuildOutcome, RunId, WatchCommand, WatchEvent};

/// Counters reported when the watch loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub rebuilds: u64,
    pub failed: u64,
}

/// Drives the [`WatchCore`] from a channel of `WatchEvent`s and runs the
/// rebuild pipeline whenever the core asks for one.
///
/// The runner should carry a `Watch`-mode notifier so failing rebuilds do
/// not end the process. Each rebuild reports `RebuildFinished` back into the
/// same channel it reads from.
///
/// With a snapshot attached, each rebuild first copies the current output
/// aside and a failed rebuild puts that copy back before `RebuildFinished`
/// is sent.
pub struct WatchRuntime {
    core: WatchCore,
    event_tx: mpsc::Sender<WatchEvent>,
    event_rx: mpsc::Receiver<WatchEvent>,
    runner: PipelineRunner,
    rebuild: Node,
    snapshot: Option<OutputSnapshot>,
    in_flight: Option<JoinHandle<()>>,
}

impl fmt::Debug for WatchRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRuntime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl WatchRuntime {
    pub fn new(
        core: WatchCore,
        event_tx: mpsc::Sender<WatchEvent>,
        event_rx: mpsc::Receiver<WatchEvent>,
        runner: PipelineRunner,
        rebuild: Node,
    ) -> Self {
        Self {
            core,
            event_tx,
            event_rx,
            runner,
            rebuild,
            snapshot: None,
            in_flight: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: OutputSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<WatchSummary> {
        info!("watch loop started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("watch event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "watch loop received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                break;
            }
        }

        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                info!("stopping with a rebuild in flight; abandoning it");
                handle.abort();
            }
        }

        let summary = WatchSummary {
            rebuilds: self.core.rebuilds_started(),
            failed: self.core.rebuilds_failed(),
        };
        info!(rebuilds = summary.rebuilds, failed = summary.failed, "watch loop exiting");
        Ok(summary)
    }

    fn execute_command(&mut self, command: WatchCommand) {
        match command {
            WatchCommand::StartRebuild { run_id } => self.spawn_rebuild(run_id),
        }
    }

    fn spawn_rebuild(&mut self, run_id: RunId) {
        debug!(run_id, "spawning rebuild pipeline");

        let runner = self.runner.clone();
        let rebuild = self.rebuild.clone();
        let snapshot = self.snapshot.clone();
        let tx = self.event_tx.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let snapshot = match snapshot {
                Some(snapshot) => capture(snapshot).await,
                None => None,
            };
            let outcome = match runner.run(rebuild).await {
                Ok(()) => RebuildOutcome::Success,
                Err(err) => RebuildOutcome::Failed {
                    failures: err.failures,
                },
            };
            if let Some(snapshot) = snapshot {
                settle(snapshot, &outcome).await;
            }
            let _ = tx.send(WatchEvent::RebuildFinished { run_id, outcome }).await;
        }));
    }
}

async fn capture(snapshot: OutputSnapshot) -> Option<OutputSnapshot> {
    let worker = snapshot.clone();
    match run_blocking(names::WATCH, move || worker.capture()).await {
        Ok(()) => Some(snapshot),
        Err(failure) => {
            warn!(error = %failure, "could not snapshot the current output; rebuilding without one");
            let _ = run_blocking(names::WATCH, move || snapshot.discard()).await;
            None
        }
    }
}

async fn settle(snapshot: OutputSnapshot, outcome: &RebuildOutcome) {
    let result = match outcome {
        RebuildOutcome::Success => run_blocking(names::WATCH, move || snapshot.discard()).await,
        RebuildOutcome::Failed { .. } => {
            run_blocking(names::WATCH, move || snapshot.restore()).await
        }
    };
    if let Err(failure) = result {
        warn!(error = %failure, "could not settle the output snapshot");
    }
}
