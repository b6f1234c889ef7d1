use access_stats_logs::Report;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

const REPORT_SUFFIX: &str = "_stats.json";

/// Returns the path of the JSON report for the given log file.
///
/// The report is stored next to the log file, with the last extension
/// replaced, e.g. `logs/access.log` becomes `logs/access_stats.json`.
pub fn report_path(log_path: &Path) -> PathBuf {
    let mut file_name = log_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();

    file_name.push(REPORT_SUFFIX);
    log_path.with_file_name(file_name)
}

/// Prints the human-readable summary of a report.
pub fn print_report(out: &mut impl Write, log_path: &Path, json: &str) -> anyhow::Result<()> {
    writeln!(out, "Statistics for {}:", log_path.display())?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Saves the report as JSON next to the log file and returns the path of
/// the created file.
pub async fn save_report(log_path: &Path, json: &str) -> anyhow::Result<PathBuf> {
    let path = report_path(log_path);

    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}

/// Renders the report in the format shared by the console output and the
/// saved report file.
pub fn render_report(report: &Report) -> anyhow::Result<String> {
    report
        .to_json_pretty()
        .context("Failed to serialize report")
}
