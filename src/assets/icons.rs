use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::task::{Failure, Task, TaskFuture, names};

use super::{collect_sources, run_blocking};

/// Copies icon files verbatim, keeping their relative layout.
#[derive(Debug, Clone)]
pub struct IconsTask {
    root: PathBuf,
    patterns: Vec<String>,
    out_dir: PathBuf,
}

impl IconsTask {
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns,
            out_dir: out_dir.into(),
        }
    }

    fn copy(&self) -> Result<(), Failure> {
        let sources = collect_sources(names::COPY_ICONS, &self.root, &self.patterns)?;

        for source in &sources {
            let target = self.out_dir.join(&source.rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Failure::from_io(names::COPY_ICONS, parent, &e))?;
            }
            fs::copy(&source.path, &target)
                .map_err(|e| Failure::from_io(names::COPY_ICONS, &source.path, &e))?;
        }

        info!(task = names::COPY_ICONS, files = sources.len(), "icons copied");
        Ok(())
    }
}

impl Task for IconsTask {
    fn name(&self) -> &str {
        names::COPY_ICONS
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    fn run(&self) -> TaskFuture<'_> {
        let this = self.clone();
        Box::pin(run_blocking(names::COPY_ICONS, move || this.copy()))
    }
}
