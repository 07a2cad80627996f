#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sitepipe::notifier::FailureNotifier;
use sitepipe::pipeline::PipelineRunner;
use sitepipe::task::{Task, TaskRegistry};
use sitepipe::types::RunMode;

pub use sitepipe_test_utils::builders::ConfigFileBuilder;
pub use sitepipe_test_utils::fake_server::FakeDevServer;
pub use sitepipe_test_utils::fake_task::{EventLog, FakeTask};
pub use sitepipe_test_utils::{init_tracing, with_timeout};

/// Records exit-hook calls instead of exiting the test process.
#[derive(Debug, Clone, Default)]
pub struct ExitRecorder {
    calls: Arc<AtomicUsize>,
}

impl ExitRecorder {
    pub fn notifier(&self, mode: RunMode) -> Arc<FailureNotifier> {
        let calls = Arc::clone(&self.calls);
        Arc::new(FailureNotifier::with_exit_hook(mode, move |code| {
            assert_eq!(code, 1);
            calls.fetch_add(1, Ordering::SeqCst);
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A watch-mode runner over `tasks`.
pub fn watch_runner(tasks: &[Arc<FakeTask>]) -> PipelineRunner {
    PipelineRunner::new(registry_of(tasks), ExitRecorder::default().notifier(RunMode::Watch))
}

pub fn registry_of(tasks: &[Arc<FakeTask>]) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for task in tasks {
        registry.insert(Arc::clone(task) as Arc<dyn Task>);
    }
    registry
}
