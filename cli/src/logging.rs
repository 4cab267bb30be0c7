use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Mirrors the node service's `init_tracing`: `INFO` by default, `--debug`
/// forces `DEBUG` and turns target names back on.
pub fn init_tracing(debug: bool) {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .init();
}
