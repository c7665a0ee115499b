//! # Forecast Backtest
//!
//! Time-respecting cross-validation for forecasting models.
//!
//! ## Features
//!
//! - Fold splitting with expanding or sliding training windows and a
//!   configurable gap, guaranteed never to leak test data into training
//! - Accuracy metrics (MAE, sMAPE, WAPE, bias) and cross-fold stability
//!   via the `forecast_metrics` crate
//! - Naive and weekly seasonal-naive baselines with a comparison summary
//! - Deterministic configuration fingerprints for reproducibility
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use forecast_backtest::{
//!     BacktestConfig, BacktestOrchestrator, ModelConfig, SeriesData, SeriesKey, SplitConfig,
//!     SplitStrategy,
//! };
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates: Vec<NaiveDate> = (0..120).map(|i| start + Duration::days(i)).collect();
//! let values: Vec<f64> = (0..120).map(|i| 100.0 + (i % 7) as f64).collect();
//! let key = SeriesKey::new("store-1", "sku-42", dates[0], dates[119]);
//! let series = SeriesData::new(key, dates, values)?;
//!
//! let split = SplitConfig::new(SplitStrategy::Expanding, 5, 14, 30, 0)?;
//! let config = BacktestConfig::new(ModelConfig::MovingAverage { window: 7 }, split);
//!
//! let response = BacktestOrchestrator::default().run_backtest(&series, &config)?;
//! assert_eq!(response.main_model_results.fold_results.len(), 5);
//! assert!(response.leakage_check_passed);
//! # Ok::<(), forecast_backtest::BacktestError>(())
//! ```

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod results;
pub mod splitter;

// Re-export commonly used types
pub use crate::backtest::BacktestOrchestrator;
pub use crate::config::{BacktestConfig, BacktestLimits, ModelConfig, SplitConfig, SplitStrategy};
pub use crate::data::{CsvSeriesLoader, InMemorySeriesLoader, SeriesData, SeriesKey, SeriesLoader};
pub use crate::error::{BacktestError, Result};
pub use crate::models::{create_model, DefaultModelFactory, ForecastModel, ModelFactory};
pub use crate::results::{
    BacktestResponse, BaselineComparison, FoldDetails, FoldResult, MetricComparison,
    ModelBacktestResult,
};
pub use crate::splitter::{split, validate_no_leakage, Fold, Folds, SplitPlan, TimeSeriesSplitter};
pub use forecast_metrics::{MetricResult, MetricsError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
