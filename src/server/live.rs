// src/server/live.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, middleware};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::task::{Failure, TaskFuture, names};

use super::{DevServer, ReloadHandle};

pub const RELOAD_PATH: &str = "/__livereload";
pub const CLIENT_PATH: &str = "/__livereload.js";

/// How long a poll may hang before answering with the unchanged generation.
const POLL_TIMEOUT: Duration = Duration::from_secs(30);

const SCRIPT_TAG: &str = "<script src=\"/__livereload.js\"></script>";

const CLIENT_SCRIPT: &str = r#"(function () {
  var since = null;
  function poll() {
    var url = '/__livereload' + (since === null ? '' : '?since=' + since);
    fetch(url, { cache: 'no-store' })
      .then(function (res) { return res.text(); })
      .then(function (text) {
        var generation = parseInt(text, 10);
        if (since !== null && generation !== since) {
          window.location.reload();
          return;
        }
        since = generation;
        poll();
      })
      .catch(function () { setTimeout(poll, 1000); });
  }
  poll();
})();
"#;

/// Serves a directory over HTTP and pushes reloads to open pages.
pub struct LiveServer {
    addr: String,
    root: PathBuf,
    reload: ReloadHandle,
    running: Mutex<Option<(SocketAddr, JoinHandle<()>)>>,
}

impl LiveServer {
    pub fn new(host: &str, port: u16, root: impl Into<PathBuf>) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            root: root.into(),
            reload: ReloadHandle::new(),
            running: Mutex::new(None),
        }
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        self.reload.clone()
    }

    /// Bound address once started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|(addr, _)| *addr)
    }

    async fn start_inner(&self) -> Result<(), Failure> {
        let mut running = self.running.lock().await;
        if let Some((addr, _)) = running.as_ref() {
            info!(%addr, "dev server already running");
            return Ok(());
        }

        let listener = TcpListener::bind(&self.addr).await.map_err(|e| {
            Failure::io(names::START_DEV_SERVER, format!("binding {}: {e}", self.addr))
        })?;
        let addr = listener.local_addr().map_err(|e| {
            Failure::io(names::START_DEV_SERVER, format!("reading bound address: {e}"))
        })?;

        let app = build_router(self.root.clone(), self.reload.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "dev server stopped");
            }
        });

        info!(
            root = %self.root.display(),
            "dev server listening on http://{addr}"
        );
        *running = Some((addr, handle));
        Ok(())
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.running.get_mut().take() {
            handle.abort();
        }
    }
}

impl DevServer for LiveServer {
    fn start(&self) -> TaskFuture<'_> {
        Box::pin(self.start_inner())
    }

    fn reload(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            let generation = self.reload.bump();
            info!(generation, "browser reload requested");
            Ok(())
        })
    }
}

/// Router serving `root` plus the live-reload endpoints.
pub fn build_router(root: impl Into<PathBuf>, reload: ReloadHandle) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(poll_reload))
        .route(CLIENT_PATH, get(client_script))
        .fallback_service(ServeDir::new(root.into()))
        .layer(middleware::map_response(inject_reload_script))
        .layer(TraceLayer::new_for_http())
        .with_state(reload)
}

#[derive(Debug, Deserialize)]
struct PollQuery {
    since: Option<u64>,
}

/// Answer with the current generation, waiting for a change first when the
/// caller already has it.
async fn poll_reload(State(reload): State<ReloadHandle>, Query(query): Query<PollQuery>) -> String {
    let mut rx = reload.subscribe();
    let current = *rx.borrow_and_update();

    match query.since {
        Some(since) if since == current => {
            let _ = tokio::time::timeout(POLL_TIMEOUT, rx.changed()).await;
            let latest = *rx.borrow();
            latest.to_string()
        }
        _ => current.to_string(),
    }
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        CLIENT_SCRIPT,
    )
}

async fn inject_reload_script(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if !is_html || response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "failed to buffer html response for reload injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_script_tag(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Insert the reload client before the last `</body>`, or append it.
pub fn inject_script_tag(html: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => format!("{}{SCRIPT_TAG}{}", &html[..idx], &html[idx..]),
        None => format!("{html}{SCRIPT_TAG}"),
    }
}
