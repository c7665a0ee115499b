//! Cross-fold stability and aggregation
//!
//! The stability index is the coefficient of variation of one metric across
//! the folds of a backtest, expressed as a percentage. Lower is steadier.

use crate::result::MetricResult;
use crate::{STABILITY_INDEX, STABILITY_SUFFIX};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Stability index above which a warning is attached
pub const HIGH_INSTABILITY_THRESHOLD: f64 = 50.0;

/// Mean metric values and their stability indices, keyed by metric name
/// and by `"{metric}_stability"` respectively.
pub type AggregatedMetrics = (BTreeMap<String, f64>, BTreeMap<String, f64>);

/// Coefficient of variation `std / |mean| * 100` over the non-NaN values.
///
/// Fewer than two valid values yield NaN, a zero mean yields `+inf`; both
/// come with a warning.
pub fn stability_index(values: &[f64]) -> MetricResult {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();

    if valid.len() < 2 {
        return MetricResult::undefined(
            STABILITY_INDEX,
            valid.len(),
            format!(
                "Stability index needs at least 2 valid values, got {}",
                valid.len()
            ),
        );
    }

    let mean = valid.iter().mean();
    let std = valid.iter().population_std_dev();

    if mean == 0.0 {
        return MetricResult::new(STABILITY_INDEX, f64::INFINITY, valid.len())
            .with_warning("Mean of values is zero, coefficient of variation is unbounded");
    }

    let value = std / mean.abs() * 100.0;
    let mut result = MetricResult::new(STABILITY_INDEX, value, valid.len());
    if value > HIGH_INSTABILITY_THRESHOLD {
        result = result.with_warning(format!(
            "High instability across folds: {:.2}% exceeds {:.0}%",
            value, HIGH_INSTABILITY_THRESHOLD
        ));
    }

    result
}

/// Aggregate per-fold metric maps into means and stability indices.
///
/// Metric names are taken from the first fold. For each name the mean is
/// computed over folds where the value is present and not NaN; the
/// stability index uses the same values. A metric without any valid value
/// aggregates to NaN in both maps.
pub fn aggregate_fold_metrics(fold_metrics: &[BTreeMap<String, f64>]) -> AggregatedMetrics {
    let mut means = BTreeMap::new();
    let mut stability = BTreeMap::new();

    let Some(first) = fold_metrics.first() else {
        return (means, stability);
    };

    for name in first.keys() {
        let values: Vec<f64> = fold_metrics
            .iter()
            .filter_map(|fold| fold.get(name).copied())
            .filter(|v| !v.is_nan())
            .collect();

        let stability_key = format!("{}{}", name, STABILITY_SUFFIX);
        if values.is_empty() {
            means.insert(name.clone(), f64::NAN);
            stability.insert(stability_key, f64::NAN);
            continue;
        }

        means.insert(name.clone(), values.iter().mean());
        stability.insert(stability_key, stability_index(&values).value);
    }

    (means, stability)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_constant_values_are_perfectly_stable() {
        let result = stability_index(&[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(result.value, 0.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_nan_values_are_ignored() {
        let result = stability_index(&[f64::NAN, 5.0]);
        assert!(result.value.is_nan());
        assert_eq!(result.n_samples, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_mean() {
        let result = stability_index(&[-1.0, 1.0]);
        assert_eq!(result.value, f64::INFINITY);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_high_instability_warning() {
        let result = stability_index(&[1.0, 10.0]);
        assert!(result.value > HIGH_INSTABILITY_THRESHOLD);
        assert!(result.warnings[0].contains("High instability"));
    }

    #[test]
    fn test_aggregate_empty() {
        let (means, stability) = aggregate_fold_metrics(&[]);
        assert!(means.is_empty());
        assert!(stability.is_empty());
    }

    #[test]
    fn test_aggregate_skips_nan_folds() {
        let folds = vec![
            fold(&[("mae", 2.0), ("wape", f64::NAN)]),
            fold(&[("mae", 4.0), ("wape", f64::NAN)]),
            fold(&[("mae", f64::NAN), ("wape", f64::NAN)]),
        ];
        let (means, stability) = aggregate_fold_metrics(&folds);

        assert_eq!(means["mae"], 3.0);
        assert!((stability["mae_stability"] - 100.0 / 3.0).abs() < 1e-9);
        assert!(means["wape"].is_nan());
        assert!(stability["wape_stability"].is_nan());
    }
}
