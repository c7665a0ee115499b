//! Point-forecast accuracy metrics
//!
//! Contains implementations of:
//! - Mean Absolute Error (MAE)
//! - Symmetric Mean Absolute Percentage Error (sMAPE)
//! - Weighted Absolute Percentage Error (WAPE)
//! - Mean forecast bias

use crate::result::MetricResult;
use crate::{MetricsError, Result, BIAS, MAE, SMAPE, WAPE};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Checks the input pair and short-circuits empty inputs.
///
/// A pair of empty slices yields a NaN result with a warning. Slices of
/// different lengths are an error, including when only one of them is empty.
fn check_inputs(name: &str, actuals: &[f64], predictions: &[f64]) -> Result<Option<MetricResult>> {
    if actuals.is_empty() && predictions.is_empty() {
        return Ok(Some(MetricResult::undefined(
            name,
            0,
            format!("Empty input arrays, {} is undefined", name),
        )));
    }

    if actuals.len() != predictions.len() {
        return Err(MetricsError::LengthMismatch {
            actual_len: actuals.len(),
            predicted_len: predictions.len(),
        });
    }

    Ok(None)
}

/// Mean absolute error: `mean(|actual - predicted|)`
pub fn mae(actuals: &[f64], predictions: &[f64]) -> Result<MetricResult> {
    if let Some(empty) = check_inputs(MAE, actuals, predictions)? {
        return Ok(empty);
    }

    let value = actuals
        .iter()
        .zip(predictions)
        .map(|(a, p)| (a - p).abs())
        .mean();

    Ok(MetricResult::new(MAE, value, actuals.len()))
}

/// Symmetric mean absolute percentage error, bounded to `[0, 200]`.
///
/// A pair where both values are exactly zero counts as a perfect forecast
/// (ratio 0). A zero denominator with a non-zero numerator counts as the
/// maximum ratio of 2.
pub fn smape(actuals: &[f64], predictions: &[f64]) -> Result<MetricResult> {
    if let Some(empty) = check_inputs(SMAPE, actuals, predictions)? {
        return Ok(empty);
    }

    let mut zero_samples = 0usize;
    let ratios: Vec<f64> = actuals
        .iter()
        .zip(predictions)
        .map(|(&a, &p)| {
            if a == 0.0 || p == 0.0 {
                zero_samples += 1;
            }

            let numerator = (a - p).abs();
            let denominator = a.abs() + p.abs();

            if a == 0.0 && p == 0.0 {
                0.0
            } else if denominator == 0.0 {
                2.0
            } else {
                2.0 * numerator / denominator
            }
        })
        .collect();

    let value = 100.0 * ratios.mean();
    let mut result = MetricResult::new(SMAPE, value, actuals.len());

    if zero_samples > 0 {
        result = result.with_warning(format!(
            "{} of {} samples contain a zero actual or prediction",
            zero_samples,
            actuals.len()
        ));
    }

    Ok(result)
}

/// Weighted absolute percentage error: `sum(|error|) / sum(|actual|) * 100`.
///
/// When the actuals sum to zero in absolute terms the metric is undefined
/// and `+inf` is returned with a warning.
pub fn wape(actuals: &[f64], predictions: &[f64]) -> Result<MetricResult> {
    if let Some(empty) = check_inputs(WAPE, actuals, predictions)? {
        return Ok(empty);
    }

    let abs_error: f64 = actuals
        .iter()
        .zip(predictions)
        .map(|(a, p)| (a - p).abs())
        .sum();
    let abs_actual: f64 = actuals.iter().map(|a| a.abs()).sum();

    if abs_actual == 0.0 {
        return Ok(
            MetricResult::new(WAPE, f64::INFINITY, actuals.len()).with_warning(
                "Sum of absolute actuals is zero, WAPE is undefined".to_string(),
            ),
        );
    }

    Ok(MetricResult::new(
        WAPE,
        abs_error / abs_actual * 100.0,
        actuals.len(),
    ))
}

/// Mean bias: `mean(actual - predicted)`.
///
/// Positive values mean the model under-forecasts, negative values mean it
/// over-forecasts. A warning is attached when the bias is larger than the
/// standard deviation of the errors.
pub fn bias(actuals: &[f64], predictions: &[f64]) -> Result<MetricResult> {
    if let Some(empty) = check_inputs(BIAS, actuals, predictions)? {
        return Ok(empty);
    }

    let errors: Vec<f64> = actuals
        .iter()
        .zip(predictions)
        .map(|(a, p)| a - p)
        .collect();

    let value = errors.iter().mean();
    let spread = errors.iter().population_std_dev();

    let mut result = MetricResult::new(BIAS, value, actuals.len());
    if value.abs() > spread {
        let direction = if value > 0.0 {
            "under-forecasting"
        } else {
            "over-forecasting"
        };
        result = result.with_warning(format!(
            "Systematic {}: |bias| {:.4} exceeds error std {:.4}",
            direction,
            value.abs(),
            spread
        ));
    }

    Ok(result)
}

/// Compute MAE, sMAPE, WAPE and bias in one pass over the inputs.
pub fn calculate_all(actuals: &[f64], predictions: &[f64]) -> Result<BTreeMap<String, MetricResult>> {
    let results = [
        mae(actuals, predictions)?,
        smape(actuals, predictions)?,
        wape(actuals, predictions)?,
        bias(actuals, predictions)?,
    ];

    Ok(results
        .into_iter()
        .map(|result| (result.name.clone(), result))
        .collect())
}
