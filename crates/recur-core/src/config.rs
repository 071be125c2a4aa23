//! Detection configuration
//!
//! Thresholds and weights used by the similarity engine, analyzer, detector
//! and pattern store. Config is resolved in two layers:
//! 1. An explicit path, or the override file in the data dir
//!    (~/.local/share/recur/config/detection.toml)
//! 2. Built-in defaults
//!
//! Override files only need to set the fields they change:
//!
//! ```toml
//! [detection]
//! similarity_threshold = 0.85
//! min_occurrences = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionConfig {
    /// Minimum combined similarity for two expenses to share a cluster
    pub similarity_threshold: f64,
    /// Minimum cluster size handed to the analyzer
    pub min_occurrences: usize,
    /// Relative amount band (e.g., 0.15 = 15%) inside which amounts score above zero
    pub amount_tolerance: f64,
    /// Patterns below this confidence are discarded
    pub min_confidence: f64,
    /// Absolute currency difference under which a detected pattern duplicates a stored one
    pub merge_amount_tolerance: f64,
    /// Weight of description similarity in the combined score
    pub description_weight: f64,
    /// Weight of amount similarity in the combined score
    pub amount_weight: f64,
    /// Weight of category equality in the combined score
    pub category_weight: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_occurrences: 2,
            amount_tolerance: 0.15,
            min_confidence: 0.6,
            merge_amount_tolerance: 1.0,
            description_weight: 0.5,
            amount_weight: 0.3,
            category_weight: 0.2,
        }
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
}

/// Document shape written by `to_toml_string`
#[derive(Serialize)]
struct ConfigFile<'a> {
    detection: &'a DetectionConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDetection {
    similarity_threshold: Option<f64>,
    min_occurrences: Option<usize>,
    amount_tolerance: Option<f64>,
    min_confidence: Option<f64>,
    merge_amount_tolerance: Option<f64>,
    description_weight: Option<f64>,
    amount_weight: Option<f64>,
    category_weight: Option<f64>,
}

impl DetectionConfig {
    /// Parse a TOML document, layering any `[detection]` values over the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(d) = raw.detection {
            if let Some(v) = d.similarity_threshold {
                config.similarity_threshold = v;
            }
            if let Some(v) = d.min_occurrences {
                config.min_occurrences = v;
            }
            if let Some(v) = d.amount_tolerance {
                config.amount_tolerance = v;
            }
            if let Some(v) = d.min_confidence {
                config.min_confidence = v;
            }
            if let Some(v) = d.merge_amount_tolerance {
                config.merge_amount_tolerance = v;
            }
            if let Some(v) = d.description_weight {
                config.description_weight = v;
            }
            if let Some(v) = d.amount_weight {
                config.amount_weight = v;
            }
            if let Some(v) = d.category_weight {
                config.category_weight = v;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Render as a TOML document that `from_toml_str` reads back unchanged
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&ConfigFile { detection: self })?)
    }

    /// Load configuration (explicit path, then data dir override, then defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(path) if path.exists() => {
                debug!("Loading detection config from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&content)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Check that thresholds and weights are usable
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("min_confidence", self.min_confidence),
            ("description_weight", self.description_weight),
            ("amount_weight", self.amount_weight),
            ("category_weight", self.category_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.amount_tolerance <= 0.0 {
            return Err(Error::Config(format!(
                "amount_tolerance must be positive, got {}",
                self.amount_tolerance
            )));
        }
        if self.merge_amount_tolerance <= 0.0 {
            return Err(Error::Config(format!(
                "merge_amount_tolerance must be positive, got {}",
                self.merge_amount_tolerance
            )));
        }
        if self.min_occurrences < 2 {
            return Err(Error::Config(format!(
                "min_occurrences must be at least 2, got {}",
                self.min_occurrences
            )));
        }

        let weight_sum = self.description_weight + self.amount_weight + self.category_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "similarity weights must sum to 1, got {:.4}",
                weight_sum
            )));
        }

        Ok(())
    }
}

/// Default data directory (~/.local/share/recur on Linux)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("recur"))
}

/// Default override location for the detection config
pub fn default_config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config").join("detection.toml"))
}
