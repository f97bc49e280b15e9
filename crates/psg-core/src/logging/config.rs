//! Where log output goes and how verbose it is.
//!
//! `PSG_LOG` picks the level and beats `RUST_LOG`; `PSG_LOG_FORMAT` picks
//! between `human` and `json`. Explicit arguments to [`LogConfig::from_env`]
//! override both.

use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "PSG_LOG";
pub const ENV_LOG_FORMAT: &str = "PSG_LOG_FORMAT";

/// Output encoding for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" => Some(LogFormat::Human),
            "json" | "jsonl" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Most verbose level named in a RUST_LOG directive string.
///
/// Target prefixes are ignored, so `psg_core=debug,hyper=warn` gives debug.
pub fn level_from_rust_log(directives: &str) -> Option<LevelFilter> {
    const BY_VERBOSITY: [(&str, LevelFilter); 5] = [
        ("trace", LevelFilter::TRACE),
        ("debug", LevelFilter::DEBUG),
        ("info", LevelFilter::INFO),
        ("warn", LevelFilter::WARN),
        ("error", LevelFilter::ERROR),
    ];
    let lowered = directives.to_ascii_lowercase();
    BY_VERBOSITY
        .into_iter()
        .find(|(name, _)| lowered.contains(name))
        .map(|(_, level)| level)
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Trace shows skipped segments, debug every vertex/edge mutation and
    /// spike verdict, info one summary per pass.
    pub level: LevelFilter,
    /// Only affects human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            timestamps: true,
        }
    }
}

impl LogConfig {
    pub fn from_env(level: Option<LevelFilter>, format: Option<LogFormat>) -> Self {
        let env_level = match std::env::var(ENV_LOG_LEVEL) {
            Ok(val) => val.trim().parse::<LevelFilter>().ok(),
            Err(_) => std::env::var("RUST_LOG")
                .ok()
                .and_then(|val| level_from_rust_log(&val)),
        };
        let env_format = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|val| LogFormat::from_env_value(&val));

        let defaults = LogConfig::default();
        LogConfig {
            format: format.or(env_format).unwrap_or(defaults.format),
            level: level.or(env_level).unwrap_or(defaults.level),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}
