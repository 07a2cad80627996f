use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitepipe::task::{Failure, Task, TaskFuture};

/// Shared, ordered record of `start:<name>` / `end:<name>` entries.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Position of `entry` in the log, if recorded.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries.lock().unwrap().iter().position(|e| e == entry)
    }
}

/// A scripted task that:
/// - records `start:<name>` and `end:<name>` in a shared [`EventLog`]
/// - sleeps for a configurable delay
/// - always succeeds, or always fails with a given failure
/// - counts how many times it was run
pub struct FakeTask {
    name: String,
    outputs: Vec<PathBuf>,
    delay: Duration,
    failure: Option<Failure>,
    calls: AtomicUsize,
    log: EventLog,
}

impl FakeTask {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            outputs: Vec::new(),
            delay: Duration::ZERO,
            failure: None,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Fail every run with an `io` failure carrying `message`.
    pub fn failing(self, message: &str) -> Self {
        let failure = Failure::io(self.name.clone(), message);
        self.failing_with(failure)
    }

    pub fn failing_with(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Task for FakeTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.clone()
    }

    fn run(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.push(format!("start:{}", self.name));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.log.push(format!("end:{}", self.name));
            match &self.failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(()),
            }
        })
    }
}
