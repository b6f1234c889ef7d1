use access_stats_logs::analyze;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, clap::Parser)]
struct Options {
    /// The path to the access log file to analyze
    path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let options = Options::parse();

    let file = File::open(&options.path)
        .await
        .with_context(|| format!("Failed to open {}", options.path.display()))?;

    let report = analyze(BufReader::new(file)).await?;
    println!("{}", report.to_json_pretty()?);
    println!();

    let num_methods = report.method_count.len();
    let method_total = report.method_count.values().sum::<u64>();
    let total_requests = report.total_requests;

    println!("Number of methods: {num_methods}");
    println!("Requests with a method: {method_total}");
    println!("Total number of requests: {total_requests}");

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    fmt().compact().with_env_filter(env_filter).init();
}
