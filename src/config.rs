use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::{Dimension, DimensionWeights};

/// Scoring configuration, loadable from a TOML file.
///
/// Every field is optional; an absent file or table falls back to the
/// built-in weights.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Relative weight of each quality dimension
    #[serde(default)]
    pub weights: DimensionWeights,
}

impl ScoringConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalysisError::ConfigMissing {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject weight tables that are negative or do not sum to 1.0
    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            let weight = self.weights.get(dimension);
            if weight < 0.0 {
                bail!("Weight for {dimension} must be non-negative, got {weight}");
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            bail!("Dimension weights must sum to 1.0, got {sum}");
        }

        Ok(())
    }
}
