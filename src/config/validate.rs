// src/config/validate.rs

use std::collections::HashSet;

use globset::Glob;

use crate::assets::styles::resolve_browsers;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SitepipeError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SitepipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.paths, raw.styles, raw.site, raw.server, raw.watch,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_globs(cfg)?;
    validate_output_dirs(cfg)?;
    validate_styles(cfg)?;
    validate_site(cfg)?;
    Ok(())
}

fn validate_globs(cfg: &RawConfigFile) -> Result<()> {
    let groups = [
        ("paths.styles", &cfg.paths.styles),
        ("paths.scripts", &cfg.paths.scripts),
        ("paths.icons", &cfg.paths.icons),
        ("watch.paths", &cfg.watch.paths),
        ("watch.exclude", &cfg.watch.exclude),
    ];

    for (field, patterns) in groups {
        for pattern in patterns.iter() {
            Glob::new(pattern).map_err(|e| {
                SitepipeError::ConfigError(format!(
                    "invalid glob '{pattern}' in `{field}`: {e}"
                ))
            })?;
        }
    }
    Ok(())
}

fn validate_output_dirs(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for dir in cfg.paths.output_dirs() {
        let trimmed = dir.trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            return Err(SitepipeError::ConfigError(format!(
                "output directory '{dir}' would clean the project root"
            )));
        }
        if !seen.insert(trimmed.to_string()) {
            return Err(SitepipeError::ConfigError(format!(
                "output directory '{dir}' is used by more than one task"
            )));
        }
    }

    if cfg.paths.scripts_bundle.trim().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[paths].scripts_bundle must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_styles(cfg: &RawConfigFile) -> Result<()> {
    resolve_browsers(&cfg.styles.browsers)
        .map(|_| ())
        .map_err(|e| SitepipeError::ConfigError(format!("[styles].browsers: {e}")))
}

fn validate_site(cfg: &RawConfigFile) -> Result<()> {
    if cfg.site.cmd.trim().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[site].cmd must not be empty".to_string(),
        ));
    }
    Ok(())
}
