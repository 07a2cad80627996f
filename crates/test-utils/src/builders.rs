#![allow(dead_code)]

use std::path::Path;

use sitepipe::config::{ConfigFile, ProjectLayout, RawConfigFile};
use sitepipe::types::TriggerWhileRunningBehaviour;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_styles(mut self, pattern: &str) -> Self {
        self.config.paths.styles = vec![pattern.to_string()];
        self
    }

    pub fn with_scripts(mut self, pattern: &str) -> Self {
        self.config.paths.scripts = vec![pattern.to_string()];
        self
    }

    pub fn with_icons(mut self, pattern: &str) -> Self {
        self.config.paths.icons = vec![pattern.to_string()];
        self
    }

    pub fn with_browsers(mut self, queries: &[&str]) -> Self {
        self.config.styles.browsers = queries.iter().map(|q| q.to_string()).collect();
        self
    }

    pub fn without_source_maps(mut self) -> Self {
        self.config.styles.source_maps = false;
        self
    }

    pub fn with_site_cmd(mut self, cmd: &str) -> Self {
        self.config.site.cmd = cmd.to_string();
        self
    }

    pub fn with_watch(mut self, pattern: &str) -> Self {
        self.config.watch.paths.push(pattern.to_string());
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn with_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.watch.triggered_while_running_behaviour = behaviour;
        self
    }

    /// Raw (unvalidated) config, for validation tests.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn layout(self, root: &Path) -> ProjectLayout {
        ProjectLayout::new(root, self.build())
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
