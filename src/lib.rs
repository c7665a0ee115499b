//! # Forecast Backtest Workspace
//!
//! Umbrella crate over the backtesting engine and its metrics library.
//!
//! ## Example
//!
//! ```
//! use forecast_backtest_workspace::metrics;
//!
//! let result = metrics::mae(&[100.0, 110.0, 90.0], &[98.0, 112.0, 88.0]).unwrap();
//! assert!((result.value - 2.0).abs() < 1e-9);
//! ```

pub use forecast_backtest as backtest;
pub use forecast_metrics as metrics;

pub use forecast_backtest::{
    BacktestConfig, BacktestError, BacktestOrchestrator, BacktestResponse, ModelConfig,
    SeriesData, SeriesKey, SplitConfig, SplitStrategy,
};
pub use forecast_metrics::{MetricResult, MetricsError};
