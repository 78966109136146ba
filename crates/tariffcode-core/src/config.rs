//! Search configuration, loaded from `search-config.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::code::VAGUE_TERM_CODE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables shared by training and inference.
///
/// Every field has a default so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Depth of the label space the model was trained at.
    pub training_digits: usize,
    /// Fraction of grouped scores kept before renormalising.
    pub top_fraction: f32,
    /// Results scoring below this end the ranking walk.
    pub score_cutoff: f32,
    /// Results below this ratio of the best score are discarded.
    pub min_confidence_ratio: f32,
    /// Stop once the returned scores sum to at least this much.
    pub cumulative_cutoff: f32,
    /// Sentinel code for vague terms, at full length.
    pub vague_code: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            training_digits: 8,
            top_fraction: 0.05,
            score_cutoff: 0.01,
            min_confidence_ratio: 0.05,
            cumulative_cutoff: 0.9,
            vague_code: VAGUE_TERM_CODE.to_string(),
        }
    }
}

impl SearchConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded search config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.training_digits, 8);
        assert_eq!(config.top_fraction, 0.05);
        assert_eq!(config.score_cutoff, 0.01);
        assert_eq!(config.min_confidence_ratio, 0.05);
        assert_eq!(config.cumulative_cutoff, 0.9);
        assert_eq!(config.vague_code, "vvvvvvvvvv");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = SearchConfig::from_toml("score_cutoff = 0.05\ntraining_digits = 10\n").unwrap();
        assert_eq!(config.score_cutoff, 0.05);
        assert_eq!(config.training_digits, 10);
        assert_eq!(config.top_fraction, 0.05);
        assert_eq!(config.vague_code, "vvvvvvvvvv");
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(SearchConfig::from_toml("").unwrap(), SearchConfig::default());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(SearchConfig::from_toml("top_fraction = \"lots\"").is_err());
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(SearchConfig::load(None).unwrap(), SearchConfig::default());
    }

    #[test]
    fn load_missing_file_errors() {
        let err = SearchConfig::load(Some(Path::new("/nonexistent/search-config.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
