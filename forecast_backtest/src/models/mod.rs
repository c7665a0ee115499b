//! Forecasting models driven by the backtest engine
//!
//! The engine treats models as an opaque capability: fit on a training
//! slice, then predict a number of steps ahead. Concrete models are selected
//! through the closed [`ModelConfig`] enum so that every variant is handled
//! exhaustively by [`create_model`].

use crate::config::ModelConfig;
use crate::error::{BacktestError, Result};
use std::fmt::Debug;

pub mod exponential_smoothing;
pub mod moving_average;
pub mod naive;

pub use exponential_smoothing::ExponentialSmoothingModel;
pub use moving_average::MovingAverageModel;
pub use naive::{NaiveModel, SeasonalNaiveModel};

/// Forecast model that can be fitted on a series and asked for predictions
pub trait ForecastModel: Debug {
    /// Name of the model
    fn name(&self) -> &str;

    /// Fewest observations `fit` accepts
    fn min_observations(&self) -> usize;

    /// Fit the model on chronologically ordered observations
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    /// Predict `horizon` steps past the end of the fitted data
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Model parameters as a JSON object
    fn params(&self) -> serde_json::Value;

    fn is_fitted(&self) -> bool;
}

/// Fail with [`BacktestError::InsufficientModelData`] below a model's floor
pub(crate) fn ensure_observations(model: &str, required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(BacktestError::InsufficientModelData {
            model: model.to_string(),
            required,
            available,
        });
    }
    Ok(())
}

pub(crate) fn not_fitted(model: &str) -> BacktestError {
    BacktestError::ModelError(format!("{} must be fitted before predicting", model))
}

/// Build an unfitted model for a configuration
pub fn create_model(config: &ModelConfig) -> Result<Box<dyn ForecastModel>> {
    Ok(match *config {
        ModelConfig::Naive => Box::new(NaiveModel::new()),
        ModelConfig::SeasonalNaive { season_length } => {
            Box::new(SeasonalNaiveModel::new(season_length)?)
        }
        ModelConfig::MovingAverage { window } => Box::new(MovingAverageModel::new(window)?),
        ModelConfig::ExponentialSmoothing { alpha } => {
            Box::new(ExponentialSmoothingModel::new(alpha)?)
        }
    })
}

/// Source of fresh model instances, one per fold
pub trait ModelFactory: Send + Sync {
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn ForecastModel>>;
}

/// Factory backed by [`create_model`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModelFactory;

impl ModelFactory for DefaultModelFactory {
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn ForecastModel>> {
        create_model(config)
    }
}

impl<F> ModelFactory for F
where
    F: Fn(&ModelConfig) -> Result<Box<dyn ForecastModel>> + Send + Sync,
{
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn ForecastModel>> {
        self(config)
    }
}
