//! Numeric aggregate helpers shared by the rule evaluators
//!
//! All helpers are total functions: empty input and zero/negative
//! denominators return 0.0 instead of erroring, since callers guard
//! against degenerate inputs upstream and a missing baseline is an
//! expected condition, not a failure.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ratio of `a` to `b`, or 0.0 when `b <= 0`.
pub fn safe_ratio(a: f64, b: f64) -> f64 {
    if b <= 0.0 {
        return 0.0;
    }
    a / b
}

/// Median of a slice. Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median absolute deviation, the robust spread estimator used by the
/// expense anomaly detector. Returns 0.0 for an empty slice.
pub fn mad(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&deviations)
}

/// Round to 2 decimal places (cents).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 3 decimal places (anomaly scores).
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[1000.0; 7]), 1000.0);
    }

    #[test]
    fn test_safe_ratio_guards_zero_and_negative() {
        assert_eq!(safe_ratio(10.0, 0.0), 0.0);
        assert_eq!(safe_ratio(10.0, -5.0), 0.0);
        assert_eq!(safe_ratio(3.0, 2.0), 1.5);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[10.0, 12.0, 11.0, 13.0, 1000.0]), 12.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_mad_resists_outliers() {
        // Median 12, absolute deviations [2, 0, 1, 1, 988] -> MAD 1
        assert_eq!(mad(&[10.0, 12.0, 11.0, 13.0, 1000.0]), 1.0);
        // Uniform values have zero spread
        assert_eq!(mad(&[5.0, 5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round3(4.56789), 4.568);
    }
}
