//! Tracing setup for the binary. Output goes to stderr so command results
//! on stdout stay machine-readable.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_JSON_ENV: &str = "ECOCHAIN_LOG_JSON";

/// Install the global subscriber. `RUST_LOG` selects levels (default
/// `info`); `ECOCHAIN_LOG_JSON=1` switches to JSON lines. Safe to call
/// more than once.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_requested(std::env::var(LOG_JSON_ENV).ok().as_deref()) {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn json_requested(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1") | Some("true"))
}
