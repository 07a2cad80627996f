// src/engine/task.rs

//! The `watch` leaf task.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::assets::OutputSnapshot;
use crate::assets::snapshot::STATE_DIR;
use crate::config::WatchSection;
use crate::pipeline::{Node, PipelineRunner};
use crate::task::{Failure, Task, TaskFuture, names};
use crate::watch::{WatchProfile, spawn_watcher};

use super::machine::WatchCore;
use super::runtime::WatchRuntime;
use super::{WatchEvent, WatchOptions};

/// Watches the project and rebuilds on change until Ctrl-C.
pub struct WatchTask {
    root: PathBuf,
    section: WatchSection,
    runner: PipelineRunner,
    rebuild: Node,
    snapshot: Option<OutputSnapshot>,
}

impl WatchTask {
    /// `runner` must not contain this task; it runs `rebuild` for each change.
    pub fn new(
        root: impl Into<PathBuf>,
        section: WatchSection,
        runner: PipelineRunner,
        rebuild: Node,
    ) -> Self {
        Self {
            root: root.into(),
            section,
            runner,
            rebuild,
            snapshot: None,
        }
    }

    /// Keep the previous output around each rebuild, see [`OutputSnapshot`].
    pub fn with_snapshot(mut self, snapshot: OutputSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    async fn watch(&self) -> Result<(), Failure> {
        // The snapshot store lives under the project root; changes there
        // must never trigger a rebuild.
        let mut section = self.section.clone();
        section.exclude.push(format!("{STATE_DIR}/**"));
        let profile = WatchProfile::from_config(&section)
            .map_err(|e| Failure::io(names::WATCH, format!("{e:#}")))?;

        let (tx, rx) = mpsc::channel::<WatchEvent>(64);

        let _watcher = spawn_watcher(
            self.root.clone(),
            profile,
            Duration::from_millis(self.section.debounce_ms),
            tx.clone(),
        )
        .map_err(|e| Failure::io(names::WATCH, format!("starting file watcher: {e:#}")))?;

        // Ctrl-C → graceful shutdown.
        {
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                let _ = tx.send(WatchEvent::ShutdownRequested).await;
            });
        }

        info!(
            patterns = ?self.section.paths,
            behaviour = ?self.section.triggered_while_running_behaviour,
            "watching for changes"
        );

        let core = WatchCore::new(
            self.section.triggered_while_running_behaviour,
            WatchOptions::default(),
        );
        let mut runtime =
            WatchRuntime::new(core, tx, rx, self.runner.clone(), self.rebuild.clone());
        if let Some(snapshot) = &self.snapshot {
            runtime = runtime.with_snapshot(snapshot.clone());
        }
        runtime
            .run()
            .await
            .map_err(|e| Failure::io(names::WATCH, e.to_string()))?;
        Ok(())
    }
}

impl Task for WatchTask {
    fn name(&self) -> &str {
        names::WATCH
    }

    fn run(&self) -> TaskFuture<'_> {
        Box::pin(self.watch())
    }
}
