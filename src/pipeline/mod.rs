// src/pipeline/mod.rs

//! Pipelines: explicit task trees and the interpreter that walks them.
//!
//! - [`node`] defines the `Leaf | Sequence | Parallel` tree.
//! - [`runner`] interprets a tree against a [`TaskRegistry`](crate::task::TaskRegistry).
//! - [`definitions`] holds the fixed, named pipelines selectable on the CLI.
//! - [`validate`] checks a tree before it runs (registered leaves, disjoint
//!   outputs between parallel siblings).

use std::fmt;

use thiserror::Error;

use crate::task::Failure;

pub mod definitions;
pub mod node;
pub mod runner;
pub mod validate;

pub use definitions::{Pipeline, PipelineName};
pub use node::Node;
pub use runner::PipelineRunner;
pub use validate::validate_pipeline;

/// One or more leaf failures surfaced by a pipeline run.
///
/// A failing `sequence` carries the single failure that stopped it; a failing
/// `parallel` group carries every failure of its members.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct PipelineError {
    pub failures: Vec<Failure>,
}

impl PipelineError {
    pub fn single(failure: Failure) -> Self {
        Self {
            failures: vec![failure],
        }
    }

    /// Names of the failing tasks, in report order.
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.task.as_str()).collect()
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [only] => write!(f, "task failed: {only}"),
            many => {
                write!(f, "{} tasks failed", many.len())?;
                for failure in many {
                    write!(f, "\n  - {failure}")?;
                }
                Ok(())
            }
        }
    }
}
