// src/pipeline/runner.rs

//! Pipeline interpreter.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::notifier::FailureNotifier;
use crate::task::{Failure, TaskName, TaskRegistry};

use super::{Node, PipelineError};

type RunFuture = Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'static>>;

/// Walks a [`Node`] tree, running leaves from the registry.
///
/// Every leaf failure goes through the notifier exactly once, at the leaf,
/// before it propagates upward through the combinators.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    registry: Arc<TaskRegistry>,
    notifier: Arc<FailureNotifier>,
}

impl PipelineRunner {
    pub fn new(registry: TaskRegistry, notifier: Arc<FailureNotifier>) -> Self {
        Self {
            registry: Arc::new(registry),
            notifier,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &FailureNotifier {
        &self.notifier
    }

    /// Run `node` to completion.
    ///
    /// The returned future owns everything it needs, so it can be spawned.
    pub fn run(&self, node: Node) -> RunFuture {
        let this = self.clone();
        Box::pin(async move {
            match node {
                Node::Leaf(name) => this.run_leaf(name).await,
                Node::Sequence(children) => this.run_sequence(children).await,
                Node::Parallel(children) => this.run_parallel(children).await,
            }
        })
    }

    async fn run_leaf(&self, name: TaskName) -> Result<(), PipelineError> {
        let Some(task) = self.registry.get(&name) else {
            let failure = Failure::io(name.clone(), format!("task '{name}' is not registered"));
            self.notifier.notify(&failure);
            return Err(PipelineError::single(failure));
        };

        info!(task = %name, "starting");
        let started = Instant::now();

        match task.run().await {
            Ok(()) => {
                info!(
                    task = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "finished"
                );
                Ok(())
            }
            Err(failure) => {
                warn!(
                    task = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "failed"
                );
                self.notifier.notify(&failure);
                Err(PipelineError::single(failure))
            }
        }
    }

    async fn run_sequence(&self, children: Vec<Node>) -> Result<(), PipelineError> {
        let total = children.len();
        for (index, child) in children.into_iter().enumerate() {
            if let Err(err) = self.run(child).await {
                debug!(
                    step = index + 1,
                    total,
                    "sequence stopped; skipping remaining steps"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    async fn run_parallel(&self, children: Vec<Node>) -> Result<(), PipelineError> {
        if children.is_empty() {
            return Ok(());
        }

        // Spawn every member before awaiting any of them.
        let mut set = JoinSet::new();
        for (index, child) in children.into_iter().enumerate() {
            let fut = self.run(child);
            set.spawn(async move { (index, fut.await) });
        }

        let mut failed: Vec<(usize, Vec<Failure>)> = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((index, Err(err))) => failed.push((index, err.failures)),
                Err(join_err) => {
                    let failure =
                        Failure::io("parallel", format!("parallel member aborted: {join_err}"));
                    self.notifier.notify(&failure);
                    failed.push((usize::MAX, vec![failure]));
                }
            }
        }

        if failed.is_empty() {
            return Ok(());
        }

        // Report in declaration order, not completion order.
        failed.sort_by_key(|(index, _)| *index);
        let failures = failed.into_iter().flat_map(|(_, f)| f).collect();
        Err(PipelineError { failures })
    }
}
