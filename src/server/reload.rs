use std::sync::Arc;

use tokio::sync::watch;

/// Shared reload generation counter.
///
/// Every `bump` is one reload; browsers long-poll until the generation they
/// last saw changes.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Advance the generation and return the new value.
    pub fn bump(&self) -> u64 {
        self.tx.send_modify(|generation| *generation += 1);
        self.generation()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}
