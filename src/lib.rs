//! Command line driver for [access_stats_logs].
//!
//! For every log file found by [discover::discover_log_files] the driver
//! analyzes the file, prints the resulting report and saves it as
//! `<name>_stats.json` next to the log file.

pub mod config;
pub mod discover;
pub mod output;
pub mod util;


pub use crate::config::Config;
pub use access_stats_logs::Report;

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::{info, instrument};

/// Analyzes the given log file, or all log files in the given directory.
///
/// Files are processed one after another. The first file that can't be read
/// aborts the run; reports of files processed before that are kept.
pub async fn run(
    path: &Path,
    config: &Config,
    out: &mut impl Write,
) -> anyhow::Result<Vec<(PathBuf, Report)>> {
    let files = discover::discover_log_files(path, &config.log_extension).await?;
    if files.is_empty() {
        info!("No log files found in {}", path.display());
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let report = process_file(&file, config, out).await?;
        reports.push((file, report));
    }

    Ok(reports)
}

/// Analyzes a single log file, prints the report and saves it unless
/// [Config::write_reports] is disabled.
#[instrument(skip(config, out))]
pub async fn process_file(
    path: &Path,
    config: &Config,
    out: &mut impl Write,
) -> anyhow::Result<Report> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let report = access_stats_logs::analyze(BufReader::new(file))
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    info!(total_requests = report.total_requests, "Analyzed log file");

    let json = output::render_report(&report)?;
    output::print_report(out, path, &json)?;

    if config.write_reports {
        let report_path = output::save_report(path, &json).await?;
        info!(report_path = %report_path.display(), "Saved report");
    }

    Ok(report)
}
