//! # Forecast Metrics
//!
//! Accuracy statistics for comparing forecasts against realised values.
//!
//! Every metric takes two equal-length slices (`actuals`, `predictions`) and
//! returns a [`MetricResult`]. Degenerate inputs (both slices empty, zero
//! denominators, too few folds) never produce an error: they produce a NaN or
//! infinite value together with a human-readable warning. Only a length
//! mismatch between the two slices is treated as an error, since it points to
//! a caller bug rather than a data condition.
//!
//! ```
//! use forecast_metrics::{mae, wape};
//!
//! let result = mae(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
//! assert!((result.value - 7.0 / 3.0).abs() < 1e-12);
//!
//! let undefined = wape(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
//! assert!(undefined.value.is_infinite());
//! assert!(!undefined.warnings.is_empty());
//! ```

use thiserror::Error;

pub mod accuracy;
pub mod result;
pub mod stability;

pub use crate::accuracy::{bias, calculate_all, mae, smape, wape};
pub use crate::result::MetricResult;
pub use crate::stability::{aggregate_fold_metrics, stability_index, AggregatedMetrics};

/// Name of the mean absolute error metric
pub const MAE: &str = "mae";
/// Name of the symmetric mean absolute percentage error metric
pub const SMAPE: &str = "smape";
/// Name of the weighted absolute percentage error metric
pub const WAPE: &str = "wape";
/// Name of the mean bias metric
pub const BIAS: &str = "bias";
/// Name of the cross-fold coefficient of variation
pub const STABILITY_INDEX: &str = "stability_index";

/// Suffix appended to a metric name for its cross-fold stability entry
pub const STABILITY_SUFFIX: &str = "_stability";

/// Metrics whose sign carries meaning, so that comparisons must use magnitudes
pub const SIGNED_METRICS: &[&str] = &[BIAS];

/// Returns true when a smaller magnitude is better regardless of sign
pub fn is_signed_metric(name: &str) -> bool {
    SIGNED_METRICS.contains(&name)
}

/// Errors that can occur while computing metrics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Length mismatch: {actual_len} actuals vs {predicted_len} predictions")]
    LengthMismatch {
        actual_len: usize,
        predicted_len: usize,
    },
}

/// Result type for metric calculations
pub type Result<T> = std::result::Result<T, MetricsError>;
