use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr.
///
/// Stdout is reserved for the transcript, so all diagnostics go to stderr.
/// Default level is `warn`; `verbose` raises it to `debug`. `RUST_LOG`
/// overrides both.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
