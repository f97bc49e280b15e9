//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::graph::GraphConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
        }
    }
}

/// Validate a graph config semantically.
pub fn validate_config(config: &GraphConfig) -> ValidationResult<()> {
    validate_alpha("vertex_alpha", config.vertex_alpha)?;
    validate_alpha("edge_alpha", config.edge_alpha)?;

    validate_positive_count("salient_spike_count", config.salient_spike_count)?;
    validate_positive_count("flank_window", config.flank_window)?;
    validate_positive_count("min_segment_len", config.min_segment_len)?;

    // The window starts one sample after the spike, so it must reach past that.
    if config.segment_window < 2 {
        return Err(ValidationError::InvalidValue {
            field: "segment_window".to_string(),
            message: format!("Must be at least 2, got {}", config.segment_window),
        });
    }

    // A window that can never hold min_segment_len samples would skip every segment.
    if config.segment_window - 1 < config.min_segment_len {
        return Err(ValidationError::SemanticError(format!(
            "segment_window ({}) leaves {} samples, fewer than min_segment_len ({})",
            config.segment_window,
            config.segment_window - 1,
            config.min_segment_len
        )));
    }

    let filter = &config.spike_filter;
    if !filter.max_noise_ratio.is_finite() || filter.max_noise_ratio <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "spike_filter.max_noise_ratio".to_string(),
            message: format!("Must be positive and finite, got {}", filter.max_noise_ratio),
        });
    }
    if !filter.separation_stdevs.is_finite() || filter.separation_stdevs < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "spike_filter.separation_stdevs".to_string(),
            message: format!(
                "Must be non-negative and finite, got {}",
                filter.separation_stdevs
            ),
        });
    }

    let detection = &config.detection;
    if detection.min_magnitude.is_nan() || detection.min_magnitude < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "detection.min_magnitude".to_string(),
            message: format!("Must be non-negative, got {}", detection.min_magnitude),
        });
    }
    if !(0.0..=1.0).contains(&detection.transient_tolerance) {
        return Err(ValidationError::InvalidValue {
            field: "detection.transient_tolerance".to_string(),
            message: format!("Must be in [0, 1], got {}", detection.transient_tolerance),
        });
    }

    Ok(())
}

/// Significance levels live in (0, 1].
fn validate_alpha(field: &str, alpha: f64) -> ValidationResult<()> {
    if alpha.is_nan() || alpha <= 0.0 || alpha > 1.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in (0, 1], got {}", alpha),
        });
    }
    Ok(())
}

fn validate_positive_count(field: &str, value: usize) -> ValidationResult<()> {
    if value == 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    Ok(())
}
