// src/server/mod.rs

//! Development server with live reload.
//!
//! The orchestration core only needs `start()` and `reload()`; the
//! [`DevServer`] trait is that seam. [`LiveServer`] is the production
//! implementation (axum + `tower-http`'s `ServeDir`).

use std::sync::Arc;

use crate::task::{Task, TaskFuture, names};

pub mod live;
pub mod reload;

pub use live::{LiveServer, build_router};
pub use reload::ReloadHandle;

/// A static-file server that browsers can be told to reload.
pub trait DevServer: Send + Sync {
    /// Start serving in the background. Returns once the listener is bound.
    fn start(&self) -> TaskFuture<'_>;

    /// Ask connected browsers to reload.
    fn reload(&self) -> TaskFuture<'_>;
}

/// `start-dev-server` leaf.
pub struct ServeTask {
    server: Arc<dyn DevServer>,
}

impl ServeTask {
    pub fn new(server: Arc<dyn DevServer>) -> Self {
        Self { server }
    }
}

impl Task for ServeTask {
    fn name(&self) -> &str {
        names::START_DEV_SERVER
    }

    fn run(&self) -> TaskFuture<'_> {
        self.server.start()
    }
}

/// `reload-dev-server` leaf.
pub struct ReloadTask {
    server: Arc<dyn DevServer>,
}

impl ReloadTask {
    pub fn new(server: Arc<dyn DevServer>) -> Self {
        Self { server }
    }
}

impl Task for ReloadTask {
    fn name(&self) -> &str {
        names::RELOAD_DEV_SERVER
    }

    fn run(&self) -> TaskFuture<'_> {
        self.server.reload()
    }
}
