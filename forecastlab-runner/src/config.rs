//! Serializable pipeline configuration.
//!
//! Loaded from TOML with every field defaulted, so an empty file is a valid
//! configuration. Flags on the command line override individual fields after
//! loading; call `validate()` once all overrides are applied.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use forecastlab_core::backtest::Strategy;
use forecastlab_core::domain::DEFAULT_START_CASH;
use forecastlab_core::windows::{FractionRange, MIN_RECURRENCE, PRACTICAL_MAX_RECURRENCE};

/// Content-addressed identity of a configuration (BLAKE3 hex).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("recurrence must be >= 2, got {0}")]
    Recurrence(usize),

    #[error("strategy must be 1, 2 or 3, got {0}")]
    Strategy(u8),

    #[error("{name} split [{lo}, {hi}] must lie in [0, 1] with lo <= hi")]
    Split { name: &'static str, lo: f64, hi: f64 },

    #[error("start cash must be positive and finite, got {0}")]
    StartCash(f64),

    #[error("batch size must be > 0")]
    BatchSize,

    #[error("failed to encode config: {0}")]
    Encode(String),
}

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window length `W`.
    pub recurrence: usize,
    /// Signal rule id: 1 conservative, 2 momentum, 3 classic.
    pub strategy: u8,
    pub start_cash: f64,
    pub splits: SplitConfig,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recurrence: 24,
            strategy: Strategy::default().id(),
            start_cash: DEFAULT_START_CASH,
            splits: SplitConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

/// Fractional `[lo, hi]` bounds of the three chronological partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub train: [f64; 2],
    pub validation: [f64; 2],
    pub test: [f64; 2],
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train: [0.0, 0.7],
            validation: [0.7, 0.9],
            test: [0.9, 1.0],
        }
    }
}

impl SplitConfig {
    pub fn train_range(&self) -> FractionRange {
        to_range(self.train)
    }

    pub fn validation_range(&self) -> FractionRange {
        to_range(self.validation)
    }

    pub fn test_range(&self) -> FractionRange {
        to_range(self.test)
    }

    fn named(&self) -> [(&'static str, [f64; 2]); 3] {
        [
            ("train", self.train),
            ("validation", self.validation),
            ("test", self.test),
        ]
    }
}

fn to_range([lo, hi]: [f64; 2]) -> FractionRange {
    FractionRange { lo, hi }
}

/// Parameters handed to the external trainer with each dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub epochs: usize,
    /// Seed for the order in which batches are presented.
    pub shuffle_seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            epochs: 7,
            shuffle_seed: 42,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Encode(e.to_string()))
    }

    /// Check every field. A recurrence above the practical bound only warns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recurrence < MIN_RECURRENCE {
            return Err(ConfigError::Recurrence(self.recurrence));
        }
        if self.recurrence > PRACTICAL_MAX_RECURRENCE {
            warn!(
                recurrence = self.recurrence,
                max = PRACTICAL_MAX_RECURRENCE,
                "recurrence is above the practical bound"
            );
        }
        self.strategy()?;
        for (name, [lo, hi]) in self.splits.named() {
            if to_range([lo, hi]).validate().is_err() {
                return Err(ConfigError::Split { name, lo, hi });
            }
        }
        if !(self.start_cash.is_finite() && self.start_cash > 0.0) {
            return Err(ConfigError::StartCash(self.start_cash));
        }
        if self.training.batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        Strategy::try_from(self.strategy).map_err(|_| ConfigError::Strategy(self.strategy))
    }

    /// BLAKE3 hash of the canonical JSON form.
    ///
    /// Identical configs map to the same id; any field change produces a new one.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self).map_err(|e| ConfigError::Encode(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_the_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.recurrence, 24);
        assert_eq!(config.strategy, 2);
        assert_eq!(config.start_cash, 1000.0);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.training.epochs, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            recurrence = 8
            strategy = 3

            [splits]
            test = [0.8, 1.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.recurrence, 8);
        assert_eq!(config.strategy().unwrap(), Strategy::Classic);
        assert_eq!(config.splits.test_range(), FractionRange { lo: 0.8, hi: 1.0 });
        assert_eq!(config.splits.train, [0.0, 0.7]);
        assert_eq!(config.training, TrainingConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = PipelineConfig::default();
        config.training.shuffle_seed = 7;
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let bad = |f: fn(&mut PipelineConfig)| {
            let mut c = PipelineConfig::default();
            f(&mut c);
            c.validate()
        };
        assert!(matches!(
            bad(|c| c.recurrence = 1),
            Err(ConfigError::Recurrence(1))
        ));
        assert!(matches!(bad(|c| c.strategy = 0), Err(ConfigError::Strategy(0))));
        assert!(matches!(
            bad(|c| c.splits.validation = [0.9, 0.7]),
            Err(ConfigError::Split {
                name: "validation",
                ..
            })
        ));
        assert!(matches!(
            bad(|c| c.splits.test = [0.9, 1.5]),
            Err(ConfigError::Split { name: "test", .. })
        ));
        assert!(matches!(
            bad(|c| c.start_cash = 0.0),
            Err(ConfigError::StartCash(_))
        ));
        assert!(matches!(
            bad(|c| c.start_cash = f64::NAN),
            Err(ConfigError::StartCash(_))
        ));
        assert!(matches!(
            bad(|c| c.training.batch_size = 0),
            Err(ConfigError::BatchSize)
        ));
    }

    #[test]
    fn long_recurrence_is_allowed() {
        let config = PipelineConfig {
            recurrence: 64,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn run_id_is_deterministic() {
        let config = PipelineConfig::default();
        let id1 = config.run_id().unwrap();
        let id2 = config.run_id().unwrap();
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = PipelineConfig::default();
        let b = PipelineConfig {
            strategy: 1,
            ..a.clone()
        };
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            PipelineConfig::from_toml_str("recurrence = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
