//! Backtest orchestration
//!
//! Runs a candidate model, and optionally the baseline models, across every
//! fold produced by the splitter, aggregates the per-fold metrics and
//! assembles a [`BacktestResponse`].
//!
//! Folds are independent of one another: each gets a fresh model instance
//! and disjoint input slices, so they are evaluated in parallel with rayon.
//! Results are collected in `fold_index` order regardless of execution order.

use crate::config::{content_hash, BacktestConfig, BacktestLimits, ModelConfig, SplitConfig};
use crate::data::{SeriesData, SeriesKey, SeriesLoader};
use crate::error::{BacktestError, Result};
use crate::models::{DefaultModelFactory, ModelFactory};
use crate::results::{
    build_comparison_summary, BacktestResponse, FoldDetails, FoldResult, ModelBacktestResult,
};
use crate::splitter::{Fold, TimeSeriesSplitter};
use chrono::NaiveDate;
use forecast_metrics::{aggregate_fold_metrics, calculate_all};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs backtests against a fixed set of limits and a model factory
#[derive(Clone)]
pub struct BacktestOrchestrator {
    limits: BacktestLimits,
    factory: Arc<dyn ModelFactory>,
    parallel: bool,
}

impl std::fmt::Debug for BacktestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestOrchestrator")
            .field("limits", &self.limits)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl Default for BacktestOrchestrator {
    fn default() -> Self {
        Self::new(BacktestLimits::default())
    }
}

impl BacktestOrchestrator {
    /// Create an orchestrator using the built-in models
    pub fn new(limits: BacktestLimits) -> Self {
        Self {
            limits,
            factory: Arc::new(DefaultModelFactory),
            parallel: true,
        }
    }

    /// Use a custom source of model instances
    pub fn with_factory<F: ModelFactory + 'static>(mut self, factory: F) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Evaluate folds and baselines on the rayon pool (default) or sequentially
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn limits(&self) -> &BacktestLimits {
        &self.limits
    }

    /// Validate a configuration against its own invariants and the limits
    pub fn validate_config(&self, config: &BacktestConfig) -> Result<()> {
        config.validate()?;
        self.limits.validate(&config.split_config)
    }

    /// Load the series for `key` and backtest it
    pub fn run_from_loader<L: SeriesLoader + ?Sized>(
        &self,
        loader: &L,
        key: &SeriesKey,
        config: &BacktestConfig,
    ) -> Result<BacktestResponse> {
        self.validate_config(config)?;
        let series = loader.load(key)?;
        self.run_backtest(&series, config)
    }

    /// Run one full backtest.
    ///
    /// Configuration violations and an empty series fail before any fold is
    /// evaluated. A failing baseline is logged and left out of the result.
    pub fn run_backtest(
        &self,
        series: &SeriesData,
        config: &BacktestConfig,
    ) -> Result<BacktestResponse> {
        let started = Instant::now();

        self.validate_config(config)?;
        if series.is_empty() {
            return Err(BacktestError::EmptySeries {
                key: series.key().clone(),
            });
        }

        let backtest_id = Uuid::new_v4();
        info!(
            "Starting backtest {} for {} ({} observations, model {})",
            backtest_id,
            series.key(),
            series.len(),
            config.model.model_type()
        );

        let run_main = || {
            self.evaluate_model(
                series,
                &config.model,
                &config.split_config,
                config.store_fold_details,
            )
        };
        let run_baselines = || {
            config
                .include_baselines
                .then(|| self.run_baselines(series, config))
        };

        let (main_model_results, baseline_results) = if self.parallel {
            rayon::join(run_main, run_baselines)
        } else {
            (run_main(), run_baselines())
        };
        let main_model_results = main_model_results?;

        let comparison_summary = baseline_results
            .as_ref()
            .map(|baselines| build_comparison_summary(&main_model_results, baselines));

        let splitter = TimeSeriesSplitter::new(config.split_config.clone())?;
        let leakage_check_passed = splitter.validate_no_leakage(series.dates(), series.values());
        if !leakage_check_passed {
            warn!("Backtest {} failed the leakage check", backtest_id);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Backtest {} finished in {} ms: {} folds, {} baselines",
            backtest_id,
            duration_ms,
            main_model_results.fold_results.len(),
            baseline_results.as_ref().map_or(0, |b| b.len())
        );

        Ok(BacktestResponse {
            backtest_id,
            config_hash: config.config_hash(),
            series_key: series.key().clone(),
            split_config: config.split_config.clone(),
            main_model_results,
            baseline_results,
            comparison_summary,
            duration_ms,
            leakage_check_passed,
        })
    }

    /// Backtest every baseline, dropping the ones that fail
    fn run_baselines(
        &self,
        series: &SeriesData,
        config: &BacktestConfig,
    ) -> BTreeMap<String, ModelBacktestResult> {
        let evaluate = |baseline: &ModelConfig| {
            match self.evaluate_model(
                series,
                baseline,
                &config.split_config,
                config.store_fold_details,
            ) {
                Ok(result) => Some((baseline.model_type().to_string(), result)),
                Err(e) => {
                    warn!(
                        "Baseline {} excluded from backtest: {}",
                        baseline.model_type(),
                        e
                    );
                    None
                }
            }
        };

        let baselines = ModelConfig::baselines();
        if self.parallel {
            baselines.par_iter().filter_map(evaluate).collect()
        } else {
            baselines.iter().filter_map(evaluate).collect()
        }
    }

    /// Run one model across all folds and aggregate its metrics
    pub fn evaluate_model(
        &self,
        series: &SeriesData,
        model_config: &ModelConfig,
        split_config: &SplitConfig,
        store_fold_details: bool,
    ) -> Result<ModelBacktestResult> {
        let splitter = TimeSeriesSplitter::new(split_config.clone())?;
        let folds: Vec<Fold> = splitter.split_series(series)?.collect();

        let evaluate = |fold: &Fold| self.evaluate_fold(fold, model_config, store_fold_details);
        let fold_results: Vec<FoldResult> = if self.parallel {
            folds.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            folds.iter().map(evaluate).collect::<Result<_>>()?
        };

        let per_fold: Vec<BTreeMap<String, f64>> =
            fold_results.iter().map(FoldResult::metric_values).collect();
        let (aggregated_metrics, metric_std) = aggregate_fold_metrics(&per_fold);

        let model_params = self.factory.create(model_config)?.params();

        Ok(ModelBacktestResult {
            model_type: model_config.model_type().to_string(),
            config_hash: content_hash(&(model_config, split_config)),
            model_params,
            n_splits_effective: fold_results.len(),
            fold_results,
            aggregated_metrics,
            metric_std,
        })
    }

    /// Fit a fresh model on the fold's training slice and score its forecast
    fn evaluate_fold(
        &self,
        fold: &Fold,
        model_config: &ModelConfig,
        store_fold_details: bool,
    ) -> Result<FoldResult> {
        let mut model = self.factory.create(model_config)?;
        model.fit(fold.train_values)?;

        let predictions = model.predict(fold.test_size())?;
        if predictions.len() != fold.test_size() {
            return Err(BacktestError::ModelError(format!(
                "{} returned {} predictions for a horizon of {}",
                model.name(),
                predictions.len(),
                fold.test_size()
            )));
        }

        let metrics = calculate_all(fold.test_values, &predictions)?;
        let (train_start, train_end) = date_bounds(fold.train_dates)?;
        let (test_start, test_end) = date_bounds(fold.test_dates)?;

        debug!(
            "Fold {} ({}): train {} obs to {}, test {} obs from {}",
            fold.fold_index,
            model.name(),
            fold.train_size(),
            train_end,
            fold.test_size(),
            test_start
        );

        let details = store_fold_details.then(|| FoldDetails {
            dates: fold.test_dates.to_vec(),
            actuals: fold.test_values.to_vec(),
            predictions,
        });

        Ok(FoldResult {
            fold_index: fold.fold_index,
            train_size: fold.train_size(),
            test_size: fold.test_size(),
            train_start,
            train_end,
            test_start,
            test_end,
            metrics,
            details,
        })
    }
}

fn date_bounds(dates: &[NaiveDate]) -> Result<(NaiveDate, NaiveDate)> {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => Ok((*first, *last)),
        _ => Err(BacktestError::DataError("Fold has an empty window".to_string())),
    }
}
