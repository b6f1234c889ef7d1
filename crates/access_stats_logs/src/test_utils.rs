use tracing::dispatcher::DefaultGuard;
use tracing::level_filters::LevelFilter;
use tracing::subscriber;
use tracing_subscriber::{EnvFilter, fmt};

/// Enables tracing output for the current test, including `debug` events
/// about skipped lines unless `RUST_LOG` says otherwise.
///
/// Output stops once the returned guard is dropped.
pub fn enable_tracing_output() -> DefaultGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    let subscriber = fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_test_writer()
        .finish();

    subscriber::set_default(subscriber)
}
