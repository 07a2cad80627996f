// src/logging.rs

//! `tracing` subscriber for the sitepipe binary.
//!
//! The filter is chosen from, in order: the `--log-level` flag, the
//! `SITEPIPE_LOG` variable (full `EnvFilter` directive syntax, e.g.
//! `sitepipe=debug,tower_http=info`), then `info`. Output goes to stderr
//! beside the failure banners.

use anyhow::{Result, anyhow};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "SITEPIPE_LOG";

// Request logs from the dev server are noise unless asked for.
const QUIET_DEPENDENCIES: &str = "tower_http=warn,hyper=warn";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());

    let (filter, rejected) = match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(filter_directives(None, None)), Some(e)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    if let Some(e) = rejected {
        warn!(filter = %directives, error = %e, "ignoring invalid {LOG_ENV}");
    }
    Ok(())
}

/// Filter directives for the given flag and `SITEPIPE_LOG` value.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return format!("{},{QUIET_DEPENDENCIES}", level.as_str());
    }
    match env.map(str::trim) {
        Some(env) if !env.is_empty() => env.to_string(),
        _ => format!("info,{QUIET_DEPENDENCIES}"),
    }
}
