//! Centralised tracing initialisation for toolbench binaries.
//!
//! Call [`init_tracing`] once at program start. Log lines go to stderr so
//! that rendered reports on stdout stay machine-readable.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::metrics::FLUSH_TARGET;

/// Filter directives used when `RUST_LOG` is not set: `level` everywhere,
/// and at least `info` for the end-of-run counters.
pub fn default_directives(level: Level) -> String {
    let counters = if level < Level::INFO { Level::INFO } else { level };
    format!("{level},{FLUSH_TARGET}={counters}")
}

/// Initialise the global tracing subscriber.
///
/// * `json`: when `true`, emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// Only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
