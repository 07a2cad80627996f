use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::task::{Failure, Task, TaskFuture, names};

use super::run_blocking;

/// Empties every output directory (removing and recreating it).
///
/// Running it on missing or already-empty directories is not an error.
#[derive(Debug, Clone)]
pub struct CleanTask {
    dirs: Vec<PathBuf>,
}

impl CleanTask {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn clean(&self) -> Result<(), Failure> {
        for dir in &self.dirs {
            match fs::remove_dir_all(dir) {
                Ok(()) => debug!(dir = %dir.display(), "removed output directory"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(Failure::from_io(names::CLEAN, dir, &e)),
            }
            fs::create_dir_all(dir).map_err(|e| Failure::from_io(names::CLEAN, dir, &e))?;
        }
        Ok(())
    }
}

impl Task for CleanTask {
    fn name(&self) -> &str {
        names::CLEAN
    }

    fn outputs(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }

    fn run(&self) -> TaskFuture<'_> {
        let this = self.clone();
        Box::pin(run_blocking(names::CLEAN, move || this.clean()))
    }
}
