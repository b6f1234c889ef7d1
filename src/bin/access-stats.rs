use access_stats::Config;
use std::path::PathBuf;
use tracing::{Instrument, info_span};

/// Analyze access.log files.
#[derive(clap::Parser, Debug)]
#[command(name = "access-stats", version)]
struct Opts {
    /// Path to directory containing log files or a specific log file.
    directory_or_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    access_stats::util::tracing::init();

    use clap::Parser;

    let opts = Opts::parse();
    let config = Config::from_environment()?;

    let span = info_span!("access_stats.run", path = %opts.directory_or_file.display());

    let mut stdout = std::io::stdout().lock();
    access_stats::run(&opts.directory_or_file, &config, &mut stdout)
        .instrument(span)
        .await?;

    Ok(())
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Opts::command().debug_assert();
}
