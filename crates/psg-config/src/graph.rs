//! Graph-builder tuning parameters.
//!
//! The defaults are the empirically tuned values the matching thresholds
//! were calibrated against. Every field may be omitted from a config file.

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Top-level tuning for vertex and edge incorporation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Number of spikes kept after ranking candidates by |delta|.
    pub salient_spike_count: usize,

    /// Samples inspected either side of a spike for the noise pre-filter.
    /// The post-spike side is extended by the spike's own duration.
    pub flank_window: usize,

    /// Exclusive end offset of the post-spike matching window: the segment
    /// after a spike at `i` covers `[i + 1, i + segment_window)`.
    pub segment_window: usize,

    /// Segments shorter than this are discarded without matching.
    pub min_segment_len: usize,

    /// Significance level when matching segments to vertices.
    pub vertex_alpha: f64,

    /// Significance level when matching segments during the edge pass.
    pub edge_alpha: f64,

    pub spike_filter: SpikeFilterConfig,

    pub detection: SpikeDetectionConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            salient_spike_count: 10,
            flank_window: 18,
            segment_window: 50,
            min_segment_len: 5,
            vertex_alpha: 0.05,
            edge_alpha: 0.1,
            spike_filter: SpikeFilterConfig::default(),
            detection: SpikeDetectionConfig::default(),
        }
    }
}

/// Thresholds for rejecting a spike as noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeFilterConfig {
    /// A flank whose stdev exceeds `max_noise_ratio * |mean|` is too noisy
    /// to characterize a stable state.
    pub max_noise_ratio: f64,

    /// Flank means closer than this many stdevs (of the higher-mean flank)
    /// are treated as the same level.
    pub separation_stdevs: f64,
}

impl Default for SpikeFilterConfig {
    fn default() -> Self {
        Self {
            max_noise_ratio: 1.0 / 3.0,
            separation_stdevs: 2.0,
        }
    }
}

/// Parameters for the built-in gradient spike detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeDetectionConfig {
    /// Merged spikes smaller than this (in sample units, usually watts)
    /// are dropped.
    pub min_magnitude: f64,

    /// Opposite-sign spikes within this many samples may cancel as a
    /// fleeting transient.
    pub transient_look_ahead: usize,

    /// Relative magnitude tolerance for two spikes to cancel.
    pub transient_tolerance: f64,
}

impl Default for SpikeDetectionConfig {
    fn default() -> Self {
        Self {
            min_magnitude: 10.0,
            transient_look_ahead: 5,
            transient_tolerance: 0.2,
        }
    }
}

impl GraphConfig {
    /// Load config from a JSON file.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse config from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse and validate in one step.
    pub fn load_validated(path: &std::path::Path) -> ValidationResult<Self> {
        let config = Self::from_file(path)?;
        crate::validate::validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = GraphConfig::default();
        assert_eq!(config.salient_spike_count, 10);
        assert_eq!(config.flank_window, 18);
        assert_eq!(config.segment_window, 50);
        assert_eq!(config.min_segment_len, 5);
        assert_eq!(config.vertex_alpha, 0.05);
        assert_eq!(config.edge_alpha, 0.1);
        assert!((config.spike_filter.max_noise_ratio - 1.0 / 3.0).abs() < 1e-15);
        assert_eq!(config.spike_filter.separation_stdevs, 2.0);
        assert_eq!(config.detection.min_magnitude, 10.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GraphConfig::from_str(r#"{"vertex_alpha": 0.01}"#).unwrap();
        assert_eq!(config.vertex_alpha, 0.01);
        assert_eq!(config.edge_alpha, 0.1);
        assert_eq!(config.salient_spike_count, 10);
    }

    #[test]
    fn nested_partial_json() {
        let config =
            GraphConfig::from_str(r#"{"spike_filter": {"separation_stdevs": 3.0}}"#).unwrap();
        assert_eq!(config.spike_filter.separation_stdevs, 3.0);
        assert!((config.spike_filter.max_noise_ratio - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = GraphConfig::from_str("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let mut config = GraphConfig::default();
        config.segment_window = 64;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GraphConfig::from_str(&json).unwrap(), config);
    }
}
