use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes the `tracing` logging framework.
///
/// Log output is written to stderr, so that stdout only contains the
/// reports. The verbosity can be changed with the
/// [`RUST_LOG`](tracing_subscriber::filter::EnvFilter) environment variable
/// and defaults to `INFO`.
pub fn init() {
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let log_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(log_filter);

    tracing_subscriber::registry().with(log_layer).init();
}

/// Initializes the `tracing` logging framework for tests, which only
/// outputs `WARN` and above unless `RUST_LOG` is set.
///
/// Can be called multiple times; only the first call has an effect.
#[cfg(test)]
pub fn init_for_test() {
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_test_writer().with_filter(log_filter))
        .try_init();
}
