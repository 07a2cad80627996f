// src/task/mod.rs

//! Task primitive.
//!
//! A task is a named unit of work with a single asynchronous outcome. Tasks
//! are stateless between invocations: the pipeline interpreter may run the
//! same task many times (once per watch-triggered rebuild).
//!
//! - [`failure`] holds the uniform failure model every task reports.
//! - [`registry`] maps task names (as used in pipeline trees) to
//!   implementations, so pipelines stay plain data.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

pub mod failure;
pub mod registry;

pub use failure::{Failure, FailureKind};
pub use registry::TaskRegistry;

/// Canonical task name type.
pub type TaskName = String;

/// Boxed future returned by [`Task::run`].
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Failure>> + Send + 'a>>;

/// Names of the built-in leaf tasks.
pub mod names {
    pub const CLEAN: &str = "clean";
    pub const COMPILE_STYLES: &str = "compile-styles";
    pub const COMPILE_SCRIPTS: &str = "compile-scripts";
    pub const COPY_ICONS: &str = "copy-icons";
    pub const BUILD_SPRITE_SHEET: &str = "build-sprite-sheet";
    pub const RUN_SITE_GENERATOR: &str = "run-site-generator";
    pub const START_DEV_SERVER: &str = "start-dev-server";
    pub const RELOAD_DEV_SERVER: &str = "reload-dev-server";
    pub const WATCH: &str = "watch";
}

/// Trait implemented by every leaf task.
pub trait Task: Send + Sync {
    /// Name used to reference this task from pipeline trees.
    fn name(&self) -> &str;

    /// Paths this task writes. Tasks run side by side in a `parallel` group
    /// must declare disjoint outputs.
    fn outputs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Run the task once.
    fn run(&self) -> TaskFuture<'_>;
}
