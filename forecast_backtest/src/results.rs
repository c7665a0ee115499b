//! Structured output of a backtest run
//!
//! Field names and nesting are part of the interchange format consumed by
//! the API layer; NaN and infinite metric values serialize as `null`.

use crate::config::SplitConfig;
use crate::data::SeriesKey;
use crate::error::Result;
use chrono::NaiveDate;
use forecast_metrics::{is_signed_metric, MetricResult};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Raw arrays of one fold, kept only when requested
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldDetails {
    pub dates: Vec<NaiveDate>,
    pub actuals: Vec<f64>,
    pub predictions: Vec<f64>,
}

/// Metrics of one model on one fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold_index: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
    /// Metric results keyed by metric name, warnings included
    pub metrics: BTreeMap<String, MetricResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FoldDetails>,
}

impl FoldResult {
    /// Metric values keyed by metric name
    pub fn metric_values(&self) -> BTreeMap<String, f64> {
        self.metrics
            .iter()
            .map(|(name, result)| (name.clone(), result.value))
            .collect()
    }

    /// All warnings of this fold, prefixed with the metric they belong to
    pub fn warnings(&self) -> Vec<String> {
        self.metrics
            .values()
            .flat_map(|result| {
                result
                    .warnings
                    .iter()
                    .map(move |w| format!("{}: {}", result.name, w))
            })
            .collect()
    }
}

/// Backtest outcome of one model across all folds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBacktestResult {
    pub model_type: String,
    /// Fingerprint of the model and split configuration
    pub config_hash: String,
    pub model_params: serde_json::Value,
    /// Folds actually produced, which may be fewer than requested
    pub n_splits_effective: usize,
    /// Ordered by `fold_index`
    pub fold_results: Vec<FoldResult>,
    /// Mean of each metric across folds
    pub aggregated_metrics: BTreeMap<String, f64>,
    /// Stability index of each metric, keyed `"{metric}_stability"`
    pub metric_std: BTreeMap<String, f64>,
}

impl ModelBacktestResult {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.aggregated_metrics.get(name).copied()
    }
}

/// A baseline's aggregated value for one metric and how the main model compares
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineComparison {
    pub value: f64,
    /// Positive when the main model is better; absent when undefined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_pct: Option<f64>,
}

/// Main model versus baselines for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub main: f64,
    pub baselines: BTreeMap<String, BaselineComparison>,
}

/// Percentage by which `main` improves on `baseline` (lower is better).
///
/// Signed metrics compare magnitudes. Returns `None` when the baseline is
/// zero or non-finite, or the main value is NaN.
pub fn improvement_pct(metric: &str, main: f64, baseline: f64) -> Option<f64> {
    let (main, baseline) = if is_signed_metric(metric) {
        (main.abs(), baseline.abs())
    } else {
        (main, baseline)
    };

    if baseline == 0.0 || !baseline.is_finite() || main.is_nan() {
        return None;
    }

    Some((baseline - main) / baseline * 100.0)
}

/// Compare every aggregated metric of `main` against each baseline
pub fn build_comparison_summary(
    main: &ModelBacktestResult,
    baselines: &BTreeMap<String, ModelBacktestResult>,
) -> BTreeMap<String, MetricComparison> {
    main.aggregated_metrics
        .iter()
        .map(|(metric, &main_value)| {
            let comparisons = baselines
                .iter()
                .filter_map(|(name, baseline)| {
                    let value = baseline.metric(metric)?;
                    Some((
                        name.clone(),
                        BaselineComparison {
                            value,
                            improvement_pct: improvement_pct(metric, main_value, value),
                        },
                    ))
                })
                .collect();

            (
                metric.clone(),
                MetricComparison {
                    main: main_value,
                    baselines: comparisons,
                },
            )
        })
        .collect()
}

/// Terminal output of one orchestration run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResponse {
    pub backtest_id: Uuid,
    pub config_hash: String,
    pub series_key: SeriesKey,
    pub split_config: SplitConfig,
    pub main_model_results: ModelBacktestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_results: Option<BTreeMap<String, ModelBacktestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_summary: Option<BTreeMap<String, MetricComparison>>,
    pub duration_ms: u64,
    pub leakage_check_passed: bool,
}

impl BacktestResponse {
    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Improvement of the main model over `baseline` on `metric`, if defined
    pub fn improvement_over(&self, baseline: &str, metric: &str) -> Option<f64> {
        self.comparison_summary
            .as_ref()?
            .get(metric)?
            .baselines
            .get(baseline)?
            .improvement_pct
    }
}
