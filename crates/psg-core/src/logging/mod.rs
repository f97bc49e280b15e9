//! Structured logging for graph training.
//!
//! Everything is written to stderr, either as human-readable lines or as
//! JSON objects, through a `tracing-subscriber` registry.
//!
//! ```ignore
//! use psg_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Event names used as the `event` field of graph log records.
pub mod event_names {
    pub const SPIKE_VERDICT: &str = "spike.verdict";
    pub const SEGMENT_SKIPPED: &str = "segment.skipped";
    pub const VERTEX_INSERTED: &str = "vertex.inserted";
    pub const VERTEX_UPDATED: &str = "vertex.updated";
    pub const EDGE_INSERTED: &str = "edge.inserted";
    pub const EDGE_UPDATED: &str = "edge.updated";
    pub const VERTEX_PASS_DONE: &str = "pass.vertices_done";
    pub const EDGE_PASS_DONE: &str = "pass.edges_done";
}

/// Install the global subscriber.
///
/// RUST_LOG directives win when present; otherwise everything is filtered
/// at the configured level. Returns false if a subscriber was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.level.into()));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
                    .is_ok()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
                    .is_ok()
            }
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init()
            .is_ok(),
    }
}

/// Initialize logging from the environment alone.
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env(None, None))
}
