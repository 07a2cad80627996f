use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// styles = ["src/css/**/*.css"]
/// styles_out = "assets/css"
///
/// [styles]
/// source_maps = true
/// browsers = ["defaults"]
///
/// [site]
/// cmd = "bundle exec jekyll build"
///
/// [server]
/// port = 3000
///
/// [watch]
/// paths = ["src/**/*.*", "_layouts/**/*.*"]
/// debounce_ms = 100
/// ```
///
/// All sections are optional; the defaults describe a Jekyll-style project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Only constructed through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    paths: PathsSection,
    styles: StylesSection,
    site: SiteSection,
    server: ServerSection,
    watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        paths: PathsSection,
        styles: StylesSection,
        site: SiteSection,
        server: ServerSection,
        watch: WatchSection,
    ) -> Self {
        Self {
            paths,
            styles,
            site,
            server,
            watch,
        }
    }

    pub fn paths(&self) -> &PathsSection {
        &self.paths
    }

    pub fn styles(&self) -> &StylesSection {
        &self.styles
    }

    pub fn site(&self) -> &SiteSection {
        &self.site
    }

    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.paths, raw.styles, raw.site, raw.server, raw.watch)
    }
}

/// `[paths]` section: source globs read by the asset tasks and the output
/// directories they write (all relative to the project root).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
    pub icons: Vec<String>,

    pub styles_out: String,
    pub scripts_out: String,
    /// File name of the concatenated, minified script bundle.
    pub scripts_bundle: String,
    pub icons_out: String,
    pub sprite_out: String,
    /// Directory the site generator writes to.
    pub site_out: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            styles: vec!["src/css/**/*.css".to_string()],
            scripts: vec!["src/js/**/*.js".to_string()],
            icons: vec!["src/svg/**/*.svg".to_string()],
            styles_out: "assets/css".to_string(),
            scripts_out: "assets/js".to_string(),
            scripts_bundle: "scripts.min.js".to_string(),
            icons_out: "_includes/components/svg/icons".to_string(),
            sprite_out: "_includes/components/svg/sprite".to_string(),
            site_out: "_site".to_string(),
        }
    }
}

impl PathsSection {
    /// Every directory a build writes into, i.e. what `clean` empties.
    pub fn output_dirs(&self) -> Vec<&str> {
        vec![
            self.styles_out.as_str(),
            self.scripts_out.as_str(),
            self.icons_out.as_str(),
            self.sprite_out.as_str(),
            self.site_out.as_str(),
        ]
    }
}

/// `[styles]` section: how stylesheets are compiled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StylesSection {
    /// Write a `.map` file beside every compiled stylesheet.
    pub source_maps: bool,
    /// Browserslist queries that decide which vendor prefixes are added.
    /// An empty list adds none.
    pub browsers: Vec<String>,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            source_maps: true,
            browsers: vec!["defaults".to_string()],
        }
    }
}

/// `[site]` section: the external site generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Shell command that builds the site into `paths.site_out`.
    pub cmd: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            cmd: "bundle exec jekyll build".to_string(),
        }
    }
}

/// `[server]` section: the live-reload development server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Directory to serve; `None` means `paths.site_out`.
    pub root: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: None,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Glob patterns (relative to the project root) that trigger a rebuild.
    pub paths: Vec<String>,

    /// Patterns excluded from `paths`.
    pub exclude: Vec<String>,

    /// Quiet period used to group a burst of filesystem events into a single
    /// change notification.
    pub debounce_ms: u64,

    /// `"queue"` (default) or `"drop"`.
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            paths: vec![
                "src/**/*.*".to_string(),
                "_layouts/**/*.*".to_string(),
                "collections/**/*.*".to_string(),
            ],
            exclude: Vec::new(),
            debounce_ms: 100,
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
        }
    }
}
