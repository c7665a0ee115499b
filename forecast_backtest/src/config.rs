//! Backtest configuration and validation limits
//!
//! All configuration types are immutable value objects. Their identity is a
//! short SHA-256 fingerprint of a canonical (sorted-key) JSON rendering, so
//! two equal configurations hash identically regardless of field order.

use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Number of hex characters kept from the SHA-256 digest
pub const CONFIG_HASH_LEN: usize = 16;

/// Season length of the weekly seasonal-naive baseline
pub const WEEKLY_SEASON: usize = 7;

/// How the training window moves from one fold to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Training always starts at the first observation and grows
    Expanding,
    /// Training window has a fixed length and slides forward
    Sliding,
}

/// Parameters of the time-series fold splitter.
///
/// Fields are public and deserialization does not check them; [`validate`](Self::validate)
/// is the gate, run by [`SplitConfig::new`], the splitter and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitConfig {
    pub strategy: SplitStrategy,
    /// Requested number of folds
    pub n_splits: usize,
    /// Length of each test window
    pub horizon: usize,
    /// Training size of the first fold
    pub min_train_size: usize,
    /// Samples skipped between the end of training and the start of testing
    pub gap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Expanding,
            n_splits: 5,
            horizon: 14,
            min_train_size: 30,
            gap: 0,
        }
    }
}

impl SplitConfig {
    /// Create a validated split configuration
    pub fn new(
        strategy: SplitStrategy,
        n_splits: usize,
        horizon: usize,
        min_train_size: usize,
        gap: usize,
    ) -> Result<Self> {
        let config = Self {
            strategy,
            n_splits,
            horizon,
            min_train_size,
            gap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    /// Check the structural invariants of the configuration
    pub fn validate(&self) -> Result<()> {
        if self.n_splits < 2 {
            return Err(BacktestError::ConfigError(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }
        if self.horizon < 1 {
            return Err(BacktestError::ConfigError(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.min_train_size < 1 {
            return Err(BacktestError::ConfigError(
                "min_train_size must be at least 1".to_string(),
            ));
        }
        if self.horizon <= self.gap {
            return Err(BacktestError::ConfigError(format!(
                "horizon ({}) must be greater than gap ({})",
                self.horizon, self.gap
            )));
        }
        if self.checked_min_required().is_none() {
            return Err(BacktestError::ConfigError(format!(
                "min_train_size ({}) + gap ({}) + horizon ({}) overflows",
                self.min_train_size, self.gap, self.horizon
            )));
        }
        Ok(())
    }

    fn checked_min_required(&self) -> Option<usize> {
        self.min_train_size
            .checked_add(self.gap)?
            .checked_add(self.horizon)
    }

    /// Smallest series length that yields at least one fold.
    ///
    /// Saturates at `usize::MAX` for configurations that [`validate`](Self::validate) rejects.
    pub fn min_required(&self) -> usize {
        self.checked_min_required().unwrap_or(usize::MAX)
    }

    pub fn config_hash(&self) -> String {
        content_hash(self)
    }
}

/// Closed set of forecasting models the engine can drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelConfig {
    /// Last observed value repeated over the horizon
    Naive,
    /// Last `season_length` observations cycled over the horizon
    SeasonalNaive { season_length: usize },
    /// Mean of the last `window` observations
    MovingAverage { window: usize },
    /// Simple exponential smoothing with smoothing factor `alpha`
    ExponentialSmoothing { alpha: f64 },
}

impl ModelConfig {
    /// Stable identifier used as `model_type` in results
    pub fn model_type(&self) -> &'static str {
        match self {
            ModelConfig::Naive => "naive",
            ModelConfig::SeasonalNaive { .. } => "seasonal_naive",
            ModelConfig::MovingAverage { .. } => "moving_average",
            ModelConfig::ExponentialSmoothing { .. } => "exponential_smoothing",
        }
    }

    /// Baselines every candidate model is compared against
    pub fn baselines() -> Vec<ModelConfig> {
        vec![
            ModelConfig::Naive,
            ModelConfig::SeasonalNaive {
                season_length: WEEKLY_SEASON,
            },
        ]
    }

    /// Check model parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            ModelConfig::Naive => Ok(()),
            ModelConfig::SeasonalNaive { season_length } if season_length == 0 => Err(
                BacktestError::ConfigError("season_length must be positive".to_string()),
            ),
            ModelConfig::MovingAverage { window } if window == 0 => Err(
                BacktestError::ConfigError("window must be positive".to_string()),
            ),
            ModelConfig::ExponentialSmoothing { alpha } if !(alpha > 0.0 && alpha < 1.0) => {
                Err(BacktestError::ConfigError(format!(
                    "alpha must be between 0 and 1, got {}",
                    alpha
                )))
            }
            _ => Ok(()),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Full description of one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Candidate model
    pub model: ModelConfig,
    pub split_config: SplitConfig,
    /// Also evaluate the naive and seasonal-naive baselines
    #[serde(default = "default_true")]
    pub include_baselines: bool,
    /// Keep per-fold dates, actuals and predictions in the result
    #[serde(default)]
    pub store_fold_details: bool,
}

impl BacktestConfig {
    pub fn new(model: ModelConfig, split_config: SplitConfig) -> Self {
        Self {
            model,
            split_config,
            include_baselines: true,
            store_fold_details: false,
        }
    }

    pub fn with_baselines(mut self, include_baselines: bool) -> Self {
        self.include_baselines = include_baselines;
        self
    }

    pub fn with_fold_details(mut self, store_fold_details: bool) -> Self {
        self.store_fold_details = store_fold_details;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.split_config.validate()?;
        self.model.validate()
    }

    pub fn config_hash(&self) -> String {
        content_hash(self)
    }
}

fn default_max_splits() -> usize {
    20
}
fn default_max_gap() -> usize {
    30
}
fn default_recommended_min_train_size() -> usize {
    30
}

/// Externally supplied limits used to validate a backtest before it runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestLimits {
    #[serde(default = "default_max_splits")]
    pub max_splits: usize,
    #[serde(default = "default_max_gap")]
    pub max_gap: usize,
    /// Training sizes below this are allowed but logged
    #[serde(default = "default_recommended_min_train_size")]
    pub recommended_min_train_size: usize,
}

impl Default for BacktestLimits {
    fn default() -> Self {
        Self {
            max_splits: default_max_splits(),
            max_gap: default_max_gap(),
            recommended_min_train_size: default_recommended_min_train_size(),
        }
    }
}

impl BacktestLimits {
    /// Parse limits from TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load limits from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let limits = Self::from_toml_str(&contents)?;
        info!("Loaded backtest limits from {}", path.display());
        Ok(limits)
    }

    /// Validate a split configuration against these limits.
    ///
    /// Exceeding `max_splits` or `max_gap` is an error. A training size below
    /// the recommended floor only logs a warning.
    pub fn validate(&self, split: &SplitConfig) -> Result<()> {
        if split.n_splits > self.max_splits {
            return Err(BacktestError::ConfigError(format!(
                "n_splits ({}) exceeds the maximum of {}",
                split.n_splits, self.max_splits
            )));
        }
        if split.gap > self.max_gap {
            return Err(BacktestError::ConfigError(format!(
                "gap ({}) exceeds the maximum of {}",
                split.gap, self.max_gap
            )));
        }
        if split.min_train_size < self.recommended_min_train_size {
            warn!(
                "min_train_size {} is below the recommended {}; fold metrics may be noisy",
                split.min_train_size, self.recommended_min_train_size
            );
        }
        Ok(())
    }
}

/// Recursively rebuild objects with their keys in sorted order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Short deterministic fingerprint of any serializable value
pub fn content_hash<T: Serialize + Debug>(value: &T) -> String {
    let canonical = match serde_json::to_value(value) {
        Ok(v) => canonicalize(v).to_string(),
        Err(e) => {
            warn!("Failed to serialize {:?} for hashing: {}", value, e);
            format!("{:?}", value)
        }
    };

    let digest = Sha256::digest(canonical.as_bytes());
    let mut hash = format!("{:x}", digest);
    hash.truncate(CONFIG_HASH_LEN);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_config_validation() {
        assert!(SplitConfig::new(SplitStrategy::Expanding, 1, 14, 30, 0).is_err());
        assert!(SplitConfig::new(SplitStrategy::Expanding, 5, 0, 30, 0).is_err());
        assert!(SplitConfig::new(SplitStrategy::Expanding, 5, 14, 0, 0).is_err());
        assert!(SplitConfig::new(SplitStrategy::Expanding, 5, 7, 30, 7).is_err());
        assert!(SplitConfig::new(SplitStrategy::Sliding, 5, 7, 30, 6).is_ok());
    }

    #[test]
    fn test_overflowing_window_is_rejected() {
        let err = SplitConfig::new(SplitStrategy::Expanding, 2, usize::MAX, 1, 0).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigError(_)));

        let split = SplitConfig {
            min_train_size: usize::MAX,
            ..SplitConfig::default()
        };
        assert_eq!(split.min_required(), usize::MAX);
        assert!(split.validate().is_err());
    }

    #[test]
    fn test_canonical_hash_ignores_key_order() {
        let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
        let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
        assert_eq!(content_hash(&a), content_hash(&b));
        assert_eq!(content_hash(&a).len(), CONFIG_HASH_LEN);
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::SeasonalNaive { season_length: 7 };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, json!({"model_type": "seasonal_naive", "season_length": 7}));
        assert_eq!(config.model_type(), "seasonal_naive");
    }

    #[test]
    fn test_model_config_validation() {
        assert!(ModelConfig::Naive.validate().is_ok());
        assert!(ModelConfig::MovingAverage { window: 0 }.validate().is_err());
        assert!(ModelConfig::ExponentialSmoothing { alpha: 1.0 }
            .validate()
            .is_err());
        assert!(ModelConfig::ExponentialSmoothing { alpha: f64::NAN }
            .validate()
            .is_err());
    }

    #[test]
    fn test_limits_from_partial_toml() {
        let limits = BacktestLimits::from_toml_str("max_splits = 8").unwrap();
        assert_eq!(limits.max_splits, 8);
        assert_eq!(limits.max_gap, 30);
    }

    #[test]
    fn test_limits_reject_excess() {
        let limits = BacktestLimits::default();
        let split = SplitConfig {
            n_splits: 50,
            ..SplitConfig::default()
        };
        assert!(matches!(
            limits.validate(&split),
            Err(BacktestError::ConfigError(_))
        ));
    }
}
