//! Property-based tests for mw-math statistics.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use proptest::prelude::*;
use mw_math::{
    count_ratio, count_ratio_or, f1_score, mean, mean_absolute_percentage_error, pearson,
    safe_ratio, ErrorSummary,
};

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-9;

// ============================================================================
// ratio properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A count ratio with numerator <= denominator lies in [0, 1].
    #[test]
    fn count_ratio_bounded(den in 1u64..10_000, frac in 0.0..=1.0f64) {
        let num = ((den as f64) * frac).floor() as u64;
        let r = count_ratio(num, den).unwrap();
        prop_assert!((0.0..=1.0).contains(&r), "ratio {} out of [0,1]", r);
        prop_assert_eq!(count_ratio_or(num, den, -1.0), r);
    }

    /// safe_ratio is undefined exactly when the denominator is zero (finite inputs).
    #[test]
    fn safe_ratio_undefined_iff_zero(num in -1e6..1e6f64, den in -1e6..1e6f64) {
        let r = safe_ratio(num, den);
        prop_assert_eq!(r.is_none(), den == 0.0);
    }

    /// F1 lies between min(p, r) and max(p, r).
    #[test]
    fn f1_between_precision_and_recall(p in 0.0..=1.0f64, r in 0.0..=1.0f64) {
        let f1 = f1_score(p, Some(r)).unwrap();
        prop_assert!(f1 >= p.min(r) - TOL, "f1 {} below min({}, {})", f1, p, r);
        prop_assert!(f1 <= p.max(r) + TOL, "f1 {} above max({}, {})", f1, p, r);
    }

    /// F1 never exceeds the arithmetic mean of precision and recall.
    #[test]
    fn f1_at_most_arithmetic_mean(p in 0.0..=1.0f64, r in 0.0..=1.0f64) {
        let f1 = f1_score(p, Some(r)).unwrap();
        prop_assert!(f1 <= (p + r) / 2.0 + TOL);
    }
}

// ============================================================================
// correlation properties
// ============================================================================

fn paired_samples() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(75.0..300.0f64, n),
            prop::collection::vec(75.0..300.0f64, n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Pearson r is bounded to [-1, 1] whenever defined.
    #[test]
    fn pearson_bounded((xs, ys) in paired_samples()) {
        if let Some(r) = pearson(&xs, &ys) {
            prop_assert!((-1.0..=1.0).contains(&r), "r = {}", r);
        }
    }

    /// Pearson r is symmetric in its arguments.
    #[test]
    fn pearson_symmetric((xs, ys) in paired_samples()) {
        let a = pearson(&xs, &ys);
        let b = pearson(&ys, &xs);
        match (a, b) {
            (Some(a), Some(b)) => prop_assert!((a - b).abs() <= TOL),
            (None, None) => {}
            _ => prop_assert!(false, "definedness differs: {:?} vs {:?}", a, b),
        }
    }

    /// Shifting one side by a constant leaves r unchanged.
    #[test]
    fn pearson_shift_invariant((xs, ys) in paired_samples(), shift in -50.0..50.0f64) {
        let shifted: Vec<f64> = ys.iter().map(|y| y + shift).collect();
        if let (Some(a), Some(b)) = (pearson(&xs, &ys), pearson(&xs, &shifted)) {
            prop_assert!((a - b).abs() <= 1e-6, "{} vs {}", a, b);
        }
    }
}

// ============================================================================
// error summary properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// RMSE >= MAE >= |bias| for any sample.
    #[test]
    fn rmse_dominates_mae_dominates_bias(ds in prop::collection::vec(-60.0..60.0f64, 1..50)) {
        let s = ErrorSummary::from_differences(&ds).unwrap();
        prop_assert!(s.rmse + TOL >= s.mae, "rmse {} < mae {}", s.rmse, s.mae);
        prop_assert!(s.mae + TOL >= s.bias.abs(), "mae {} < |bias| {}", s.mae, s.bias);
    }

    /// Bias equals the plain mean of the differences.
    #[test]
    fn bias_is_mean(ds in prop::collection::vec(-60.0..60.0f64, 1..50)) {
        let s = ErrorSummary::from_differences(&ds).unwrap();
        prop_assert!((s.bias - mean(&ds).unwrap()).abs() <= TOL);
    }

    /// MAPE is non-negative and defined when all references are positive.
    #[test]
    fn mape_non_negative(pairs in prop::collection::vec((-5.0..5.0f64, 1.0..6.0f64), 1..30)) {
        let (ds, refs): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let mape = mean_absolute_percentage_error(&ds, &refs).unwrap();
        prop_assert!(mape >= 0.0);
    }
}
