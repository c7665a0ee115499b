//! Result type shared by all metric calculations

use serde::{Deserialize, Serialize};

/// Outcome of one metric calculation.
///
/// `value` may be NaN or infinite for degenerate inputs; in that case
/// `warnings` explains why. Callers distinguish such results from failures
/// through the `Ok` variant they arrive in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Metric name, e.g. `"mae"`
    pub name: String,
    /// Metric value
    pub value: f64,
    /// Number of samples the value was computed from
    pub n_samples: usize,
    /// Edge-case notices
    pub warnings: Vec<String>,
}

impl MetricResult {
    /// Create a result without warnings
    pub fn new(name: &str, value: f64, n_samples: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
            n_samples,
            warnings: Vec::new(),
        }
    }

    /// NaN result carrying a single explanatory warning
    pub fn undefined(name: &str, n_samples: usize, warning: impl Into<String>) -> Self {
        Self::new(name, f64::NAN, n_samples).with_warning(warning)
    }

    /// Attach a warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Whether the value is NaN or infinite
    pub fn is_degenerate(&self) -> bool {
        !self.value.is_finite()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
