//! Diagnostic logging on stderr

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. `-v` widens result lines only.
pub const DEFAULT_FILTER: &str = "vhunter=warn";

pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
