use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Task, TaskName};

/// Lookup table from task name to implementation.
///
/// Cloning is cheap (the tasks themselves are shared).
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, Arc<dyn Task>>,
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under its own name, replacing any previous entry.
    pub fn insert(&mut self, task: Arc<dyn Task>) {
        self.tasks.insert(task.name().to_string(), task);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, task: Arc<dyn Task>) -> Self {
        self.insert(task);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }
}
