use std::path::{Path, PathBuf};

use crate::config::model::ConfigFile;

/// Configured paths resolved against the project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    config: ConfigFile,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn styles_out(&self) -> PathBuf {
        self.resolve(&self.config.paths().styles_out)
    }

    pub fn scripts_out(&self) -> PathBuf {
        self.resolve(&self.config.paths().scripts_out)
    }

    pub fn icons_out(&self) -> PathBuf {
        self.resolve(&self.config.paths().icons_out)
    }

    pub fn sprite_out(&self) -> PathBuf {
        self.resolve(&self.config.paths().sprite_out)
    }

    pub fn site_out(&self) -> PathBuf {
        self.resolve(&self.config.paths().site_out)
    }

    /// Directory served by the development server.
    pub fn server_root(&self) -> PathBuf {
        match &self.config.server().root {
            Some(root) => self.resolve(root),
            None => self.site_out(),
        }
    }

    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.config
            .paths()
            .output_dirs()
            .into_iter()
            .map(|d| self.resolve(d))
            .collect()
    }
}
