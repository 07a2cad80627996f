// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    #[error("Task not registered: {0}")]
    UnknownTask(String),

    #[error("Parallel tasks write overlapping outputs: {0}")]
    OutputOverlap(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitepipeError>;
