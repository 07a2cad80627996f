// src/pipeline/validate.rs

use std::path::PathBuf;

use crate::errors::{Result, SitepipeError};
use crate::task::TaskRegistry;

use super::Node;

/// Check a tree before running it.
///
/// This checks:
/// - every leaf names a registered task
/// - inside every `parallel` group, no two members declare overlapping
///   outputs (equal paths, or one nested inside the other)
///
/// The overlap rule also keeps `clean` out of parallel groups, since it
/// declares every output directory.
pub fn validate_pipeline(node: &Node, registry: &TaskRegistry) -> Result<()> {
    for name in node.leaves() {
        if !registry.contains(name) {
            return Err(SitepipeError::UnknownTask(name.to_string()));
        }
    }
    validate_parallel_outputs(node, registry)
}

fn validate_parallel_outputs(node: &Node, registry: &TaskRegistry) -> Result<()> {
    match node {
        Node::Leaf(_) => Ok(()),
        Node::Sequence(children) => {
            for child in children {
                validate_parallel_outputs(child, registry)?;
            }
            Ok(())
        }
        Node::Parallel(children) => {
            for child in children {
                validate_parallel_outputs(child, registry)?;
            }

            let claimed: Vec<Vec<(String, PathBuf)>> = children
                .iter()
                .map(|child| declared_outputs(child, registry))
                .collect();

            for (i, left) in claimed.iter().enumerate() {
                for right in claimed.iter().skip(i + 1) {
                    for (left_task, left_path) in left {
                        for (right_task, right_path) in right {
                            if left_path.starts_with(right_path) || right_path.starts_with(left_path) {
                                return Err(SitepipeError::OutputOverlap(format!(
                                    "'{}' ({left_task}) and '{}' ({right_task})",
                                    left_path.display(),
                                    right_path.display()
                                )));
                            }
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn declared_outputs(node: &Node, registry: &TaskRegistry) -> Vec<(String, PathBuf)> {
    node.leaves()
        .into_iter()
        .filter_map(|name| registry.get(name).map(|task| (name, task)))
        .flat_map(|(name, task)| {
            task.outputs()
                .into_iter()
                .map(move |path| (name.to_string(), path))
        })
        .collect()
}
