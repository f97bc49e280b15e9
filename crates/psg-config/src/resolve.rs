//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variable → XDG path → defaults.

use std::path::{Path, PathBuf};

use crate::graph::GraphConfig;
use crate::validate::{validate_config, ValidationResult};

/// Where the active configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument(PathBuf),

    /// Set via the PSG_CONFIG environment variable.
    Environment(PathBuf),

    /// Found in the XDG config directory.
    XdgConfig(PathBuf),

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument(p) => write!(f, "CLI argument ({})", p.display()),
            ConfigSource::Environment(p) => write!(f, "environment variable ({})", p.display()),
            ConfigSource::XdgConfig(p) => write!(f, "XDG config ({})", p.display()),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A validated configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: GraphConfig,
    pub source: ConfigSource,
}

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG_PATH: &str = "PSG_CONFIG";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.json";

/// Application name for XDG directories.
const APP_NAME: &str = "power-state-graph";

/// Locate the config file without loading it.
///
/// An explicit CLI path is returned even when it does not exist so that the
/// subsequent load reports the I/O error instead of silently falling back.
pub fn locate_config(cli_path: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_path {
        return ConfigSource::CliArgument(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        if !env_path.is_empty() {
            return ConfigSource::Environment(PathBuf::from(env_path));
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return ConfigSource::XdgConfig(path);
        }
    }

    ConfigSource::BuiltinDefault
}

/// Resolve, load and validate the graph configuration.
pub fn resolve_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    let source = locate_config(cli_path);
    let config = match &source {
        ConfigSource::CliArgument(path)
        | ConfigSource::Environment(path)
        | ConfigSource::XdgConfig(path) => GraphConfig::from_file(path)?,
        ConfigSource::BuiltinDefault => GraphConfig::default(),
    };
    validate_config(&config)?;
    Ok(ResolvedConfig { config, source })
}

/// Get the XDG config directory for the graph builder.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
