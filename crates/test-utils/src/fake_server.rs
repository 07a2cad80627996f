use std::sync::atomic::{AtomicUsize, Ordering};

use sitepipe::server::DevServer;
use sitepipe::task::TaskFuture;

/// A dev server that only counts `start()` and `reload()` calls.
#[derive(Debug, Default)]
pub struct FakeDevServer {
    starts: AtomicUsize,
    reloads: AtomicUsize,
}

impl FakeDevServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl DevServer for FakeDevServer {
    fn start(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn reload(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
