//! Power state graph configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the graph-builder tuning file (config.json)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod graph;
pub mod resolve;
pub mod validate;

pub use graph::{GraphConfig, SpikeDetectionConfig, SpikeFilterConfig};
pub use resolve::{resolve_config, ConfigSource, ResolvedConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};
