// src/pipeline/definitions.rs

//! The fixed, named pipelines.
//!
//! Trees are built from constants only; nothing here depends on runtime
//! input other than the selected name.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::errors::SitepipeError;
use crate::task::names;

use super::node::{Node, leaf, parallel, sequence};

/// Pipelines selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PipelineName {
    /// Same tree as `dev`: build, serve, watch.
    Default,
    FullBuild,
    Dev,
    StylesOnly,
    ScriptsOnly,
    IconsOnly,
    /// Copy icons, then build the sprite sheet.
    Shapes,
    /// Only run the external site generator.
    SiteOnly,
    Deploy,
}

impl PipelineName {
    pub const ALL: [PipelineName; 9] = [
        PipelineName::Default,
        PipelineName::FullBuild,
        PipelineName::Dev,
        PipelineName::StylesOnly,
        PipelineName::ScriptsOnly,
        PipelineName::IconsOnly,
        PipelineName::Shapes,
        PipelineName::SiteOnly,
        PipelineName::Deploy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineName::Default => "default",
            PipelineName::FullBuild => "full-build",
            PipelineName::Dev => "dev",
            PipelineName::StylesOnly => "styles-only",
            PipelineName::ScriptsOnly => "scripts-only",
            PipelineName::IconsOnly => "icons-only",
            PipelineName::Shapes => "shapes",
            PipelineName::SiteOnly => "site-only",
            PipelineName::Deploy => "deploy",
        }
    }
}

impl fmt::Display for PipelineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineName {
    type Err = SitepipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineName::ALL
            .into_iter()
            .find(|name| name.as_str() == s.trim())
            .ok_or_else(|| SitepipeError::UnknownPipeline(s.to_string()))
    }
}

/// A named, immutable task tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: PipelineName,
    pub description: &'static str,
    pub root: Node,
}

impl Pipeline {
    pub fn named(name: PipelineName) -> Self {
        let (description, root) = match name {
            PipelineName::Default | PipelineName::Dev => (
                "full build, start the dev server, then rebuild on changes",
                dev(),
            ),
            PipelineName::FullBuild => ("clean, compile all assets, generate the site", full_build()),
            PipelineName::StylesOnly => ("compile styles", leaf(names::COMPILE_STYLES)),
            PipelineName::ScriptsOnly => ("compile scripts", leaf(names::COMPILE_SCRIPTS)),
            PipelineName::IconsOnly => ("copy icons", leaf(names::COPY_ICONS)),
            PipelineName::Shapes => (
                "copy icons, then build the sprite sheet",
                sequence([leaf(names::COPY_ICONS), leaf(names::BUILD_SPRITE_SHEET)]),
            ),
            PipelineName::SiteOnly => ("run the site generator", leaf(names::RUN_SITE_GENERATOR)),
            PipelineName::Deploy => ("production build (no server, no watch)", full_build()),
        };

        Self {
            name,
            description,
            root,
        }
    }

    pub fn all() -> Vec<Pipeline> {
        PipelineName::ALL.into_iter().map(Pipeline::named).collect()
    }
}

/// Every asset task; their outputs are disjoint so they may run side by side.
pub fn compile_assets() -> Node {
    parallel([
        leaf(names::COMPILE_STYLES),
        leaf(names::COMPILE_SCRIPTS),
        leaf(names::COPY_ICONS),
        leaf(names::BUILD_SPRITE_SHEET),
    ])
}

/// `clean` must finish before any asset task starts writing.
pub fn full_build() -> Node {
    sequence([
        leaf(names::CLEAN),
        compile_assets(),
        leaf(names::RUN_SITE_GENERATOR),
    ])
}

pub fn dev() -> Node {
    sequence([
        full_build(),
        leaf(names::START_DEV_SERVER),
        leaf(names::WATCH),
    ])
}

/// Tree run by the watch loop for each (coalesced) change.
///
/// The reload is the last step, so it happens once per successful rebuild.
pub fn rebuild() -> Node {
    sequence([full_build(), leaf(names::RELOAD_DEV_SERVER)])
}
