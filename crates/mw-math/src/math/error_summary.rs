//! Error summaries over signed differences (predicted - reference).

use serde::{Deserialize, Serialize};

/// Mean absolute error, bias, and squared-error moments of a difference sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Number of differences summarized.
    pub n: usize,
    /// Mean of |d|.
    pub mae: f64,
    /// Mean of d (signed).
    pub bias: f64,
    /// Mean of d^2.
    pub mse: f64,
    /// sqrt(mse).
    pub rmse: f64,
}

impl ErrorSummary {
    /// Summarize a sample of signed differences. `None` for an empty sample.
    pub fn from_differences(differences: &[f64]) -> Option<Self> {
        if differences.is_empty() {
            return None;
        }
        let n = differences.len() as f64;
        let mut abs_sum = 0.0;
        let mut sum = 0.0;
        let mut sq_sum = 0.0;
        for d in differences {
            abs_sum += d.abs();
            sum += d;
            sq_sum += d * d;
        }
        let mse = sq_sum / n;
        Some(ErrorSummary {
            n: differences.len(),
            mae: abs_sum / n,
            bias: sum / n,
            mse,
            rmse: mse.sqrt(),
        })
    }
}

/// Mean of |d_i / r_i| over paired differences and references.
///
/// `None` when the sample is empty or any reference value is zero; a zero
/// reference makes the percentage error undefined rather than infinite.
pub fn mean_absolute_percentage_error(differences: &[f64], references: &[f64]) -> Option<f64> {
    if differences.is_empty() || differences.len() != references.len() {
        return None;
    }
    let mut sum = 0.0;
    for (d, r) in differences.iter().zip(references) {
        if *r == 0.0 {
            return None;
        }
        sum += (d / r).abs();
    }
    Some(sum / differences.len() as f64)
}
