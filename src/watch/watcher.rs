use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::WatchEvent;
use crate::watch::patterns::WatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher on `root` (recursively) that sends
/// `WatchEvent::FilesChanged` for paths matching `profile`.
///
/// Raw events arriving within `debounce` of each other are grouped into one
/// `FilesChanged` carrying every matching path of the burst.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profile: WatchProfile,
    debounce: Duration,
    runtime_tx: mpsc::Sender<WatchEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("sitepipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("sitepipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut changed = BTreeSet::new();
            collect_matching(&root, &profile, event, &mut changed);

            // Drain the rest of the burst.
            loop {
                match tokio::time::timeout(debounce, event_rx.recv()).await {
                    Ok(Some(event)) => collect_matching(&root, &profile, event, &mut changed),
                    Ok(None) | Err(_) => break,
                }
            }

            if changed.is_empty() {
                continue;
            }

            debug!(paths = changed.len(), "forwarding debounced change");
            let paths = changed.into_iter().collect();
            if runtime_tx
                .send(WatchEvent::FilesChanged { paths })
                .await
                .is_err()
            {
                warn!("watch runtime gone; stopping watcher loop");
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn collect_matching(
    root: &Path,
    profile: &WatchProfile,
    event: Event,
    out: &mut BTreeSet<PathBuf>,
) {
    // Reads (including our own builds reading sources) are not changes.
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }

    for path in event.paths {
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if profile.matches(&rel_str) {
            out.insert(rel.to_path_buf());
        }
    }
}
