// src/assets/mod.rs

//! Built-in leaf tasks that read sources and write build outputs.
//!
//! - [`clean`] empties every output directory.
//! - [`styles`] minifies stylesheets with `lightningcss`.
//! - [`scripts`] minifies and bundles scripts with `minifier`.
//! - [`icons`] copies icon files.
//! - [`sprite`] packs icons into a `<symbol>` sprite sheet.
//! - [`site`] runs the external site generator.
//! - [`snapshot`] keeps the previous output while a watch rebuild runs.
//!
//! File and CPU work is done on the blocking pool; only the site generator
//! is natively async (it waits on a child process).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::Glob;

use crate::task::Failure;

pub mod clean;
pub mod icons;
pub mod scripts;
pub mod site;
pub mod snapshot;
pub mod sprite;
pub mod styles;

pub use clean::CleanTask;
pub use icons::IconsTask;
pub use scripts::ScriptsTask;
pub use site::SiteTask;
pub use snapshot::OutputSnapshot;
pub use sprite::SpriteTask;
pub use styles::StylesTask;

/// A source file matched by a task's globs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (root-joined) path.
    pub path: PathBuf,
    /// Path relative to the literal prefix of the glob that matched it.
    pub rel: PathBuf,
}

/// Literal directory prefix of a glob, e.g. `src/css` for `src/css/**/*.css`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for (i, part) in parts.iter().enumerate() {
        let is_last = i + 1 == parts.len();
        if is_last || part.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(part);
    }
    base
}

/// Collect every file under `root` matching one of `patterns`, sorted by
/// path with duplicates removed.
///
/// Each pattern is only walked from its literal base directory, so output
/// directories elsewhere in the project are never scanned.
pub fn collect_sources(
    task: &str,
    root: &Path,
    patterns: &[String],
) -> Result<Vec<SourceFile>, Failure> {
    let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for pattern in patterns {
        let matcher = Glob::new(pattern)
            .map_err(|e| Failure::io(task, format!("invalid glob '{pattern}': {e}")))?
            .compile_matcher();

        let base = glob_base(pattern);
        let base_dir = root.join(&base);
        if !base_dir.is_dir() {
            continue;
        }

        let mut stack = vec![base_dir.clone()];
        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).map_err(|e| Failure::from_io(task, &dir, &e))?;
            for entry in entries {
                let path = entry.map_err(|e| Failure::from_io(task, &dir, &e))?.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                let Ok(rel_to_root) = path.strip_prefix(root) else {
                    continue;
                };
                let rel_str = rel_to_root.to_string_lossy().replace('\\', "/");
                if matcher.is_match(&rel_str) {
                    let rel = path
                        .strip_prefix(&base_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| rel_to_root.to_path_buf());
                    found.entry(path).or_insert(rel);
                }
            }
        }
    }

    Ok(found
        .into_iter()
        .map(|(path, rel)| SourceFile { path, rel })
        .collect())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(task: &str, path: &Path, contents: &[u8]) -> Result<(), Failure> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Failure::from_io(task, parent, &e))?;
    }
    fs::write(path, contents).map_err(|e| Failure::from_io(task, path, &e))
}

/// Run `f` on the blocking pool and flatten the join error into a failure.
pub(crate) async fn run_blocking<F>(task: &'static str, f: F) -> Result<(), Failure>
where
    F: FnOnce() -> Result<(), Failure> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_err) => Err(Failure::io(task, format!("worker thread failed: {join_err}"))),
    }
}
