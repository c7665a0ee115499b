//! Naive baselines: last value and last season repeated

use crate::error::{BacktestError, Result};
use crate::models::{ensure_observations, not_fitted, ForecastModel};
use serde_json::json;

/// Repeats the last observed value over the whole horizon
#[derive(Debug, Clone, Default)]
pub struct NaiveModel {
    last_value: Option<f64>,
}

impl NaiveModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForecastModel for NaiveModel {
    fn name(&self) -> &str {
        "naive"
    }

    fn min_observations(&self) -> usize {
        1
    }

    fn fit(&mut self, values: &[f64]) -> Result<()> {
        ensure_observations(self.name(), self.min_observations(), values.len())?;
        self.last_value = values.last().copied();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let last = self.last_value.ok_or_else(|| not_fitted(self.name()))?;
        Ok(vec![last; horizon])
    }

    fn params(&self) -> serde_json::Value {
        json!({ "model_type": "naive" })
    }

    fn is_fitted(&self) -> bool {
        self.last_value.is_some()
    }
}

/// Cycles the last `season_length` observations over the horizon
#[derive(Debug, Clone)]
pub struct SeasonalNaiveModel {
    season_length: usize,
    last_season: Vec<f64>,
}

impl SeasonalNaiveModel {
    pub fn new(season_length: usize) -> Result<Self> {
        if season_length == 0 {
            return Err(BacktestError::ModelError(
                "Season length must be positive".to_string(),
            ));
        }

        Ok(Self {
            season_length,
            last_season: Vec::new(),
        })
    }

    pub fn season_length(&self) -> usize {
        self.season_length
    }
}

impl ForecastModel for SeasonalNaiveModel {
    fn name(&self) -> &str {
        "seasonal_naive"
    }

    fn min_observations(&self) -> usize {
        self.season_length
    }

    fn fit(&mut self, values: &[f64]) -> Result<()> {
        ensure_observations(self.name(), self.min_observations(), values.len())?;
        self.last_season = values[values.len() - self.season_length..].to_vec();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        if self.last_season.is_empty() {
            return Err(not_fitted(self.name()));
        }

        Ok(self
            .last_season
            .iter()
            .copied()
            .cycle()
            .take(horizon)
            .collect())
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "model_type": "seasonal_naive",
            "season_length": self.season_length,
        })
    }

    fn is_fitted(&self) -> bool {
        !self.last_season.is_empty()
    }
}
