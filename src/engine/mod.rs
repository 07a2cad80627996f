// src/engine/mod.rs

//! Watch-loop engine.
//!
//! This module ties together:
//! - the pure coalescing state machine ([`machine`]): `Idle`, `Running`,
//!   `PendingRerun`
//! - the async shell that feeds it events and runs rebuilds ([`runtime`])
//! - the `watch` leaf task that wires a file watcher and Ctrl-C into the
//!   shell ([`task`])
//!
//! The core has no channels, no Tokio types and performs no IO, so its
//! transitions are tested directly.

use std::path::PathBuf;

use crate::task::Failure;

pub mod machine;
pub mod runtime;
pub mod task;

pub use machine::{WatchCommand, WatchCore, WatchState, WatchStep};
pub use runtime::{WatchRuntime, WatchSummary};
pub use task::WatchTask;
pub use crate::types::TriggerWhileRunningBehaviour;

/// Monotonic id of a rebuild started by the watch loop.
pub type RunId = u64;

/// Result of one rebuild pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    Success,
    Failed { failures: Vec<Failure> },
}

/// Options used by the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// If true, stop once a rebuild finishes with nothing pending.
    pub exit_when_idle: bool,
}

/// Events flowing into the watch loop.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// One debounced burst of changes (paths relative to the project root).
    FilesChanged { paths: Vec<PathBuf> },
    /// The rebuild pipeline with this id completed.
    RebuildFinished { run_id: RunId, outcome: RebuildOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}
