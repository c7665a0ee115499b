//! Exponential smoothing model for time series forecasting

use crate::error::{BacktestError, Result};
use crate::models::{ensure_observations, not_fitted, ForecastModel};
use serde_json::json;

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothingModel {
    /// Smoothing parameter
    alpha: f64,
    /// Current level
    level: Option<f64>,
}

impl ExponentialSmoothingModel {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(BacktestError::ModelError(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self { alpha, level: None })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl ForecastModel for ExponentialSmoothingModel {
    fn name(&self) -> &str {
        "exponential_smoothing"
    }

    fn min_observations(&self) -> usize {
        1
    }

    fn fit(&mut self, values: &[f64]) -> Result<()> {
        ensure_observations(self.name(), 1, values.len())?;

        // Initialize level with first observation
        let level = values[1..]
            .iter()
            .fold(values[0], |level, &value| {
                self.alpha * value + (1.0 - self.alpha) * level
            });

        self.level = Some(level);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        // Forecast is constant at the last level
        let level = self.level.ok_or_else(|| not_fitted(self.name()))?;
        Ok(vec![level; horizon])
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "model_type": "exponential_smoothing",
            "alpha": self.alpha,
        })
    }

    fn is_fitted(&self) -> bool {
        self.level.is_some()
    }
}
