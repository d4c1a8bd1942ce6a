//! Date regression metrics over matched pairs.

use mw_common::Scope;
use mw_config::MetricScope;
use mw_math::{pearson, ErrorSummary};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{with_roll_ups, CellKey, Combine};
use crate::matching::MatchedPair;

/// Timing error of one submission's matched events in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RegressionMetricRecord {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub region: Scope<String>,
    pub year: Scope<i32>,
    /// Contributing pairs.
    pub n: usize,
    /// Mean |predicted - reference| in days.
    pub mae: f64,
    /// Mean (predicted - reference) in days.
    pub bias: f64,
    /// Pearson r of reference vs predicted day; undefined below two pairs
    /// or without variance.
    pub correlation: Option<f64>,
}

/// Raw day pairs of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
struct DayPairs {
    reference: Vec<f64>,
    predicted: Vec<f64>,
}

impl Combine for DayPairs {
    fn combine(&mut self, other: &Self) {
        self.reference.extend_from_slice(&other.reference);
        self.predicted.extend_from_slice(&other.predicted);
    }
}

/// Compute MAE, bias and correlation per cell and roll-up.
///
/// `scope` selects the contributing pairs: only those within `tolerance`,
/// or every matched pair. Cells without a contributing pair get no row.
pub fn regression_metrics(
    pairs: &[MatchedPair],
    tolerance: u32,
    scope: MetricScope,
) -> Vec<RegressionMetricRecord> {
    let mut cells: BTreeMap<CellKey, DayPairs> = BTreeMap::new();
    let contributing = pairs.iter().filter(|p| match scope {
        MetricScope::TruePositives => p.is_true_positive(tolerance),
        MetricScope::AllMatched => true,
    });
    for pair in contributing {
        let entry = cells
            .entry(CellKey::new(pair.submission(), pair.region.as_str(), pair.year))
            .or_default();
        entry.reference.push(f64::from(pair.reference_doy));
        entry.predicted.push(f64::from(pair.predicted_doy));
    }

    with_roll_ups(cells)
        .iter()
        .filter_map(|(key, days)| {
            let differences: Vec<f64> = days
                .predicted
                .iter()
                .zip(&days.reference)
                .map(|(p, r)| p - r)
                .collect();
            let summary = ErrorSummary::from_differences(&differences)?;
            Some(RegressionMetricRecord {
                group_id: key.submission.group_id.clone(),
                method: key.submission.method.clone(),
                data_source: key.submission.data_source.clone(),
                region: key.region.clone(),
                year: key.year.clone(),
                n: summary.n,
                mae: summary.mae,
                bias: summary.bias,
                correlation: pearson(&days.reference, &days.predicted),
            })
        })
        .collect()
}
