use std::fmt::Write as _;

use crate::task::TaskName;

/// A pipeline tree. Evaluated once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single registered task, referenced by name.
    Leaf(TaskName),
    /// Children run strictly one after another; the first failure stops the rest.
    Sequence(Vec<Node>),
    /// Children run concurrently; every failure is collected.
    Parallel(Vec<Node>),
}

pub fn leaf(name: impl Into<TaskName>) -> Node {
    Node::Leaf(name.into())
}

pub fn sequence(nodes: impl IntoIterator<Item = Node>) -> Node {
    Node::Sequence(nodes.into_iter().collect())
}

pub fn parallel(nodes: impl IntoIterator<Item = Node>) -> Node {
    Node::Parallel(nodes.into_iter().collect())
}

impl Node {
    /// Leaf names in depth-first declaration order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Leaf(name) => out.push(name.as_str()),
            Node::Sequence(children) | Node::Parallel(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Indented, human-readable rendering used by `--dry-run`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Node::Leaf(name) => {
                let _ = writeln!(out, "{indent}{name}");
            }
            Node::Sequence(children) => {
                let _ = writeln!(out, "{indent}sequence");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
            Node::Parallel(children) => {
                let _ = writeln!(out, "{indent}parallel");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
        }
    }
}
