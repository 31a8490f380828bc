/// Initializes the tracing/logging infrastructure for the console.
///
/// Logs go to stderr so stdout carries only order output. `RUST_LOG`
/// overrides `default_level` when set, e.g. `RUST_LOG=chef_console=debug`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "chef_console={level},chef_common={level}",
            level = default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
