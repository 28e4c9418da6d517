//! Statistics primitives shared by every analyzer
//!
//! All functions are total: empty input yields `0` rather than a panic or a
//! NaN, and sample-count denominators are clamped to a minimum of one.

/// Z-score reported when the standard deviation is zero but the value differs
/// from the mean. Signed by the direction of the deviation.
pub const DEGENERATE_Z_SCORE: f64 = 1_000.0;

/// Arithmetic mean (`0` for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

/// Population variance (`0` for an empty slice)
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len().max(1) as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Number of standard deviations `value` sits from `mean`.
///
/// With a zero standard deviation the result is `0` when `value == mean`, and
/// `±DEGENERATE_Z_SCORE` otherwise.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        return (value - mean) / std_dev;
    }
    if value == mean {
        0.0
    } else if value > mean {
        DEGENERATE_Z_SCORE
    } else {
        -DEGENERATE_Z_SCORE
    }
}

/// Coefficient of variation (`std_dev / |mean|`).
///
/// A zero mean gives `0` for a zero spread and `f64::INFINITY` otherwise, so
/// callers that clamp (confidence) or compare (irregularity gate) behave.
pub fn coefficient_of_variation(mean: f64, std_dev: f64) -> f64 {
    if mean == 0.0 {
        return if std_dev == 0.0 { 0.0 } else { f64::INFINITY };
    }
    std_dev / mean.abs()
}

/// Period-over-period returns of a value series.
///
/// Periods whose previous value is zero have no defined return and are skipped.
pub fn returns(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Volatility of a value series: standard deviation of its returns
pub fn volatility(series: &[f64]) -> f64 {
    std_dev(&returns(series))
}
