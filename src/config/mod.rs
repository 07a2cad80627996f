// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to defaults (`loader.rs`).
//! - Validate paths and globs (`validate.rs`).
//! - Resolve configured paths against the project root (`layout.rs`).

pub mod layout;
pub mod loader;
pub mod model;
pub mod validate;

pub use layout::ProjectLayout;
pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, PathsSection, RawConfigFile, ServerSection, SiteSection, StylesSection, WatchSection,
};
