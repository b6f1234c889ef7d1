//! Configuration options, read from the environment (or a `.env` file)
//!
//! - `ACCESS_STATS_LOG_EXTENSION`: Extension of the files that are picked up
//!   when a directory is analyzed. Defaults to `log`.
//! - `ACCESS_STATS_WRITE_REPORTS`: Set to `false` to only print the reports
//!   instead of also saving them as `<name>_stats.json`. Defaults to `true`.

use anyhow::{Context, bail};
use std::env::VarError;
use std::error::Error;
use std::str::FromStr;

const DEFAULT_LOG_EXTENSION: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File extension without the leading dot.
    pub log_extension: String,
    pub write_reports: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_extension: DEFAULT_LOG_EXTENSION.to_string(),
            write_reports: true,
        }
    }
}

impl Config {
    pub fn from_environment() -> anyhow::Result<Self> {
        let log_extension = match var("ACCESS_STATS_LOG_EXTENSION")? {
            Some(extension) => normalize_extension(&extension)?,
            None => DEFAULT_LOG_EXTENSION.to_string(),
        };

        let write_reports = var_parsed("ACCESS_STATS_WRITE_REPORTS")?.unwrap_or(true);

        Ok(Self {
            log_extension,
            write_reports,
        })
    }
}

fn normalize_extension(extension: &str) -> anyhow::Result<String> {
    let extension = extension.trim();
    let extension = extension.strip_prefix('.').unwrap_or(extension);
    if extension.is_empty() {
        bail!("ACCESS_STATS_LOG_EXTENSION must not be empty");
    }

    Ok(extension.to_string())
}

/// Reads an environment variable via [dotenvy], returning `Ok(None)` if it
/// is not set.
fn var(key: &str) -> anyhow::Result<Option<String>> {
    match dotenvy::var(key) {
        Ok(content) => Ok(Some(content)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(error) => Err(error).with_context(|| format!("Failed to read {key} environment variable")),
    }
}

fn var_parsed<R>(key: &str) -> anyhow::Result<Option<R>>
where
    R: FromStr,
    R::Err: Error + Send + Sync + 'static,
{
    var(key)?
        .map(|content| {
            content
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse {key} environment variable"))
        })
        .transpose()
}
