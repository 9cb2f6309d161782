//! Configuration types for the analysis engine.
//!
//! This module provides the analysis thresholds using the builder pattern,
//! plus loading them from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{InsightError, Result};

/// Default missing fraction at or above which a column is flagged.
pub const DEFAULT_MISSINGNESS_THRESHOLD: f64 = 0.5;

/// Default IQR multiplier (Tukey's fences).
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 1.5;

/// Default number of duplicate row indices kept for display.
pub const DEFAULT_MAX_DUPLICATE_SAMPLES: usize = 10;

/// Thresholds for one analysis run.
///
/// Use [`AnalysisConfig::builder()`] to create a validated configuration
/// with a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use insightlens::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .missingness_threshold(0.3)
///     .outlier_multiplier(3.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Missing fraction (0.0 - 1.0) at or above which a column is flagged.
    /// Default: 0.5
    pub missingness_threshold: f64,

    /// Multiplier `k` applied to the IQR when computing outlier fences.
    /// Must be strictly positive.
    /// Default: 1.5
    pub outlier_multiplier: f64,

    /// How many duplicate row indices to report.
    /// Default: 10
    pub max_duplicate_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            missingness_threshold: DEFAULT_MISSINGNESS_THRESHOLD,
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
            max_duplicate_samples: DEFAULT_MAX_DUPLICATE_SAMPLES,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Keys that are absent fall back to their defaults. The loaded values
    /// are validated before being returned.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InsightError::FileNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        validate_threshold("missingness_threshold", self.missingness_threshold)?;
        validate_multiplier(self.outlier_multiplier)?;
        Ok(())
    }
}

pub(crate) fn validate_threshold(
    field: &str,
    value: f64,
) -> std::result::Result<(), ConfigValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::InvalidThreshold {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn validate_multiplier(value: f64) -> std::result::Result<(), ConfigValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigValidationError::InvalidMultiplier(value));
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid outlier multiplier: {0} (must be a finite value greater than 0)")]
    InvalidMultiplier(f64),
}

impl From<ConfigValidationError> for InsightError {
    fn from(err: ConfigValidationError) -> Self {
        InsightError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    missingness_threshold: Option<f64>,
    outlier_multiplier: Option<f64>,
    max_duplicate_samples: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the missing fraction at or above which a column is flagged.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn missingness_threshold(mut self, threshold: f64) -> Self {
        self.missingness_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier used for outlier fences.
    pub fn outlier_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_multiplier = Some(multiplier);
        self
    }

    /// Set how many duplicate row indices are reported.
    pub fn max_duplicate_samples(mut self, samples: usize) -> Self {
        self.max_duplicate_samples = Some(samples);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            missingness_threshold: self
                .missingness_threshold
                .unwrap_or(DEFAULT_MISSINGNESS_THRESHOLD),
            outlier_multiplier: self
                .outlier_multiplier
                .unwrap_or(DEFAULT_OUTLIER_MULTIPLIER),
            max_duplicate_samples: self
                .max_duplicate_samples
                .unwrap_or(DEFAULT_MAX_DUPLICATE_SAMPLES),
        };

        config.validate()?;
        Ok(config)
    }
}
