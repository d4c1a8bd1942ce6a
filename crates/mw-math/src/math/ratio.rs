//! Ratio primitives with explicit handling of undefined results.
//!
//! An undefined ratio is `None`, never `0.0` or `NaN`. Callers decide per
//! metric whether a zero denominator has a conventional value (precision)
//! or must be surfaced as undefined (recall, MAPE).

/// `numerator / denominator`, or `None` when the denominator is zero or
/// either operand is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Count ratio with a caller-chosen value for an empty denominator.
pub fn count_ratio_or(numerator: u64, denominator: u64, empty: f64) -> f64 {
    if denominator == 0 {
        return empty;
    }
    numerator as f64 / denominator as f64
}

/// Count ratio, `None` for an empty denominator.
pub fn count_ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

/// Harmonic mean of precision and recall.
///
/// Returns `Some(0.0)` when both are zero, and `None` when recall is
/// undefined.
pub fn f1_score(precision: f64, recall: Option<f64>) -> Option<f64> {
    let recall = recall?;
    let sum = precision + recall;
    if sum == 0.0 {
        return Some(0.0);
    }
    Some(2.0 * precision * recall / sum)
}
