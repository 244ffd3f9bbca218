use tracing_subscriber::EnvFilter;

/// Initializes a global tracing subscriber respecting the `RUST_LOG`
/// environment variable, defaulting to `info` for this workspace's crates.
/// Output goes to stderr so the CLI's rendered threads on stdout stay clean
/// when piped. Subsequent calls become no-ops, so tests and binaries can both
/// invoke it.
pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("coursehub_forum=info,coursehub_cli=info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_first_subscriber() {
        init_tracing();
        init_tracing();
        tracing::info!("subscriber installed once");
    }
}
