//! Configuration utilities

use tracing_subscriber::EnvFilter;

/// Load configuration from a `.env` file if one is present
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// Initialize logging from `RUST_LOG`, falling back to `default_filter`
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse a boolean flag value (`true`/`1`/`yes`/`on`, case-insensitive)
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
