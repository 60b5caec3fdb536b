//! File logging. The terminal belongs to the UI, so log lines go to disk.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use backdrop_config::Config;
use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

/// Environment variable that takes precedence over the configured level.
pub const LOG_ENV: &str = "BACKDROP_LOG";
const LOG_FILE: &str = "backdrop.log";

/// Pick the filter directive: environment first, then config.
fn directive(env: Option<String>, configured: &str) -> Option<String> {
    let directive = env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured.to_string());
    let directive = directive.trim();
    if directive.is_empty() || directive.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(directive.to_string())
    }
}

/// Install the global subscriber. Returns the log file path, or `None` when
/// logging is off.
pub fn init(configured: &str) -> Result<Option<PathBuf>> {
    let Some(directive) = directive(std::env::var(LOG_ENV).ok(), configured) else {
        return Ok(None);
    };
    let filter = EnvFilter::try_new(&directive)?;

    let dir = Config::project_dirs()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or_else(|| eyre!("could not determine a data directory for logs"))?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;
    Ok(Some(path))
}
