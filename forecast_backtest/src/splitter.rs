//! Time-series fold splitter
//!
//! Partitions a chronologically ordered series into train/test folds without
//! letting any test observation precede, or overlap with, the training data
//! of the same fold. All index bounds are half-open `[start, end)` ranges.
//!
//! Folds are produced lazily by [`Folds`], a finite iterator borrowing the
//! series. It is consumed once; calling [`TimeSeriesSplitter::split`] again
//! with the same inputs re-derives an identical sequence.

use crate::config::{SplitConfig, SplitStrategy};
use crate::data::SeriesData;
use crate::error::{BacktestError, Result};
use chrono::NaiveDate;
use std::iter::FusedIterator;
use std::ops::Range;
use tracing::{debug, warn};

/// One train/test partition of the series
#[derive(Debug, Clone, PartialEq)]
pub struct Fold<'a> {
    /// 0-based, sequential
    pub fold_index: usize,
    pub train_indices: Range<usize>,
    pub test_indices: Range<usize>,
    pub train_dates: &'a [NaiveDate],
    pub test_dates: &'a [NaiveDate],
    pub train_values: &'a [f64],
    pub test_values: &'a [f64],
}

impl<'a> Fold<'a> {
    pub fn train_size(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_size(&self) -> usize {
        self.test_indices.len()
    }

    /// Number of samples between the last training index and the first test index
    pub fn realized_gap(&self) -> usize {
        self.test_indices.start.saturating_sub(self.train_indices.end)
    }

    /// Whether the fold respects time ordering and the configured gap
    pub fn is_leak_free(&self, gap: usize) -> bool {
        let ordered_dates = match (self.train_dates.last(), self.test_dates.first()) {
            (Some(train_end), Some(test_start)) => train_end < test_start,
            _ => false,
        };

        ordered_dates
            && self.train_indices.end <= self.test_indices.start
            && self.realized_gap() == gap
    }
}

/// Fold layout derived from a configuration and a series length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPlan {
    pub n_samples: usize,
    /// Folds requested in the configuration
    pub requested_splits: usize,
    /// Folds that fit the series
    pub n_splits: usize,
    /// Offset between consecutive folds
    pub step: usize,
}

impl SplitPlan {
    /// Compute the plan, shrinking the number of folds to what the data supports
    pub fn new(config: &SplitConfig, n_samples: usize) -> Result<Self> {
        config.validate()?;
        let min_required = config.min_required();
        if n_samples < min_required {
            return Err(BacktestError::InsufficientData {
                n_samples,
                min_required,
                min_train_size: config.min_train_size,
                gap: config.gap,
                horizon: config.horizon,
            });
        }

        let available = n_samples - config.min_train_size - config.gap;
        let mut n_splits = config.n_splits.max(1);

        let needed = n_splits
            .saturating_mul(config.horizon)
            .saturating_add(config.min_train_size + config.gap);
        if needed > n_samples {
            let fitting = (available / config.horizon).max(1).min(n_splits);
            warn!(
                "Reducing n_splits from {} to {}: {} samples fit only {} test windows of {}",
                config.n_splits, fitting, n_samples, fitting, config.horizon
            );
            n_splits = fitting;
        }

        let step = if n_splits > 1 {
            ((available - config.horizon) / (n_splits - 1)).max(1)
        } else {
            config.horizon
        };

        Ok(Self {
            n_samples,
            requested_splits: config.n_splits,
            n_splits,
            step,
        })
    }

    /// Whether fewer folds will be produced than were requested
    pub fn is_reduced(&self) -> bool {
        self.n_splits < self.requested_splits
    }
}

/// Lazy, finite sequence of folds over a borrowed series
#[derive(Debug, Clone)]
pub struct Folds<'a> {
    dates: &'a [NaiveDate],
    values: &'a [f64],
    config: SplitConfig,
    plan: SplitPlan,
    next_index: usize,
}

impl<'a> Folds<'a> {
    pub fn plan(&self) -> &SplitPlan {
        &self.plan
    }

    fn bounds(&self, fold_index: usize) -> (Range<usize>, Range<usize>) {
        let offset = fold_index * self.plan.step;
        let (train_start, train_end) = match self.config.strategy {
            SplitStrategy::Expanding => (0, self.config.min_train_size + offset),
            SplitStrategy::Sliding => (offset, offset + self.config.min_train_size),
        };
        let test_start = train_end + self.config.gap;
        let test_end = test_start + self.config.horizon;

        (train_start..train_end, test_start..test_end)
    }
}

impl<'a> Iterator for Folds<'a> {
    type Item = Fold<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.plan.n_splits {
            return None;
        }

        let fold_index = self.next_index;
        let (train, test) = self.bounds(fold_index);

        if test.end > self.plan.n_samples || train.end > self.plan.n_samples {
            debug!(
                "Stopping after {} folds: fold {} would end at {} of {}",
                fold_index, fold_index, test.end, self.plan.n_samples
            );
            self.next_index = self.plan.n_splits;
            return None;
        }

        self.next_index += 1;
        Some(Fold {
            fold_index,
            train_dates: &self.dates[train.clone()],
            test_dates: &self.dates[test.clone()],
            train_values: &self.values[train.clone()],
            test_values: &self.values[test.clone()],
            train_indices: train,
            test_indices: test,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.plan.n_splits - self.next_index))
    }
}

impl<'a> FusedIterator for Folds<'a> {}

/// Splits series into time-ordered folds according to a [`SplitConfig`]
#[derive(Debug, Clone)]
pub struct TimeSeriesSplitter {
    config: SplitConfig,
}

impl TimeSeriesSplitter {
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Produce the folds for parallel `dates` and `values`
    pub fn split<'a>(&self, dates: &'a [NaiveDate], values: &'a [f64]) -> Result<Folds<'a>> {
        if dates.len() != values.len() {
            return Err(BacktestError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        let plan = SplitPlan::new(&self.config, values.len())?;
        Ok(Folds {
            dates,
            values,
            config: self.config.clone(),
            plan,
            next_index: 0,
        })
    }

    pub fn split_series<'a>(&self, series: &'a SeriesData) -> Result<Folds<'a>> {
        self.split(series.dates(), series.values())
    }

    /// Re-derive the folds and check every one for leakage.
    ///
    /// Never fails: a series that cannot be split yields `false`.
    pub fn validate_no_leakage(&self, dates: &[NaiveDate], values: &[f64]) -> bool {
        let folds = match self.split(dates, values) {
            Ok(folds) => folds,
            Err(e) => {
                warn!("Leakage check could not split the series: {}", e);
                return false;
            }
        };

        let mut checked = 0usize;
        for fold in folds {
            if !fold.is_leak_free(self.config.gap) {
                warn!(
                    "Fold {} leaks: train {:?}, test {:?}",
                    fold.fold_index, fold.train_indices, fold.test_indices
                );
                return false;
            }
            checked += 1;
        }

        checked > 0
    }
}

/// Produce folds for `dates`/`values` under `config`
pub fn split<'a>(
    dates: &'a [NaiveDate],
    values: &'a [f64],
    config: &SplitConfig,
) -> Result<Folds<'a>> {
    TimeSeriesSplitter::new(config.clone())?.split(dates, values)
}

/// Attest that every fold of `dates`/`values` under `config` is leak-free
pub fn validate_no_leakage(dates: &[NaiveDate], values: &[f64], config: &SplitConfig) -> bool {
    match TimeSeriesSplitter::new(config.clone()) {
        Ok(splitter) => splitter.validate_no_leakage(dates, values),
        Err(e) => {
            warn!("Leakage check rejected the configuration: {}", e);
            false
        }
    }
}
