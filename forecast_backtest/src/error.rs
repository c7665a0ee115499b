//! Error types for the forecast_backtest crate

use crate::data::SeriesKey;
use forecast_metrics::MetricsError;
use thiserror::Error;

/// Custom error types for the forecast_backtest crate
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Invalid or out-of-limits configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Series too short for the requested split configuration
    #[error(
        "Insufficient data: {n_samples} samples available but {min_required} required \
         (min_train_size={min_train_size} + gap={gap} + horizon={horizon}), short by {}",
        shortfall(.min_required, .n_samples)
    )]
    InsufficientData {
        n_samples: usize,
        min_required: usize,
        min_train_size: usize,
        gap: usize,
        horizon: usize,
    },

    /// A model was fitted on fewer observations than it needs
    #[error(
        "Insufficient data for {model}: need at least {required} observations, got {available}"
    )]
    InsufficientModelData {
        model: String,
        required: usize,
        available: usize,
    },

    /// The loaded series contains no observations
    #[error("No observations found for {key}")]
    EmptySeries { key: SeriesKey },

    /// Malformed series data
    #[error("Data error: {0}")]
    DataError(String),

    /// Invalid model parameters or misuse of a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from the metrics layer
    #[error("Metrics error: {0}")]
    MetricsError(#[from] MetricsError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from date parsing
    #[error("Date parsing error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from TOML settings parsing
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

fn shortfall(required: &usize, available: &usize) -> usize {
    required.saturating_sub(*available)
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, BacktestError>;

impl BacktestError {
    /// Whether the error was raised before any fold was evaluated
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            BacktestError::ConfigError(_)
                | BacktestError::InsufficientData { .. }
                | BacktestError::EmptySeries { .. }
        )
    }
}
