//! Moving average model for time series forecasting

use crate::error::{BacktestError, Result};
use crate::models::{ensure_observations, not_fitted, ForecastModel};
use serde_json::json;

/// Simple moving average model.
///
/// The forecast is flat at the mean of the last `window` observations.
#[derive(Debug, Clone)]
pub struct MovingAverageModel {
    /// Window size
    window: usize,
    /// Last calculated average
    last_average: Option<f64>,
}

impl MovingAverageModel {
    /// Create a new moving average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(BacktestError::ModelError(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            window,
            last_average: None,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl ForecastModel for MovingAverageModel {
    fn name(&self) -> &str {
        "moving_average"
    }

    fn min_observations(&self) -> usize {
        self.window
    }

    fn fit(&mut self, values: &[f64]) -> Result<()> {
        ensure_observations(self.name(), self.window, values.len())?;

        let tail = &values[values.len() - self.window..];
        self.last_average = Some(tail.iter().sum::<f64>() / self.window as f64);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let average = self.last_average.ok_or_else(|| not_fitted(self.name()))?;
        Ok(vec![average; horizon])
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "model_type": "moving_average",
            "window": self.window,
        })
    }

    fn is_fitted(&self) -> bool {
        self.last_average.is_some()
    }
}
