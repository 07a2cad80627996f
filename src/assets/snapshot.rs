// src/assets/snapshot.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::task::{Failure, names};

/// Per-project working directory, relative to the project root.
pub const STATE_DIR: &str = ".sitepipe";

/// Where the previous build's output is kept during a watch rebuild,
/// relative to the project root.
pub const SNAPSHOT_DIR: &str = ".sitepipe/previous";

/// Copy of every output directory, taken before a watch rebuild.
///
/// The rebuild starts with `clean`, so a failing rebuild would otherwise
/// leave nothing to serve. `restore` puts the previous output back after a
/// failure; `discard` drops the copy after a success.
#[derive(Debug, Clone)]
pub struct OutputSnapshot {
    dirs: Vec<PathBuf>,
    store: PathBuf,
}

impl OutputSnapshot {
    pub fn new(dirs: Vec<PathBuf>, store: impl Into<PathBuf>) -> Self {
        Self {
            dirs,
            store: store.into(),
        }
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    fn slot(&self, index: usize) -> PathBuf {
        self.store.join(index.to_string())
    }

    pub fn capture(&self) -> Result<(), Failure> {
        remove_if_present(&self.store)?;
        let mut captured = 0;
        for (index, dir) in self.dirs.iter().enumerate() {
            if dir.is_dir() {
                copy_tree(dir, &self.slot(index))?;
                captured += 1;
            }
        }
        debug!(captured, store = %self.store.display(), "previous output captured");
        Ok(())
    }

    /// Replace every output directory with its captured copy. Directories
    /// that did not exist at capture time are removed.
    pub fn restore(&self) -> Result<(), Failure> {
        for (index, dir) in self.dirs.iter().enumerate() {
            let slot = self.slot(index);
            remove_if_present(dir)?;
            if slot.is_dir() {
                copy_tree(&slot, dir)?;
            }
        }
        remove_if_present(&self.store)?;
        info!(dirs = self.dirs.len(), "previous build output restored");
        Ok(())
    }

    pub fn discard(&self) -> Result<(), Failure> {
        remove_if_present(&self.store)
    }
}

fn remove_if_present(dir: &Path) -> Result<(), Failure> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Failure::from_io(names::WATCH, dir, &e)),
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), Failure> {
    let io = |path: &Path, e: std::io::Error| Failure::from_io(names::WATCH, path, &e);

    let mut stack = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src, dst)) = stack.pop() {
        fs::create_dir_all(&dst).map_err(|e| io(&dst, e))?;
        for entry in fs::read_dir(&src).map_err(|e| io(&src, e))? {
            let path = entry.map_err(|e| io(&src, e))?.path();
            let Some(name) = path.file_name() else {
                continue;
            };
            let target = dst.join(name);
            if path.is_dir() {
                stack.push((path, target));
            } else {
                fs::copy(&path, &target).map_err(|e| io(&path, e))?;
            }
        }
    }
    Ok(())
}
