//! Per-unit event count deviation.
//!
//! For every reference unit and every submission, the number of predicted
//! events is compared with the number of reference events. Units a
//! submission never predicted on count as zero predictions.

use mw_common::{PredictedEvent, ReferenceEvent, Scope, Submission};
use mw_math::{mean_absolute_percentage_error, safe_ratio, ErrorSummary};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{left_join, with_roll_ups, CellKey, Combine};

/// Event counts of one submission on one reference unit-year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct UnitCount {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub region: String,
    pub unit_id: String,
    pub year: i32,
    pub n_reference: u64,
    pub n_predicted: u64,
}

impl UnitCount {
    /// n_predicted - n_reference.
    pub fn difference(&self) -> i64 {
        self.n_predicted as i64 - self.n_reference as i64
    }
}

/// Count error statistics of one submission in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CountDeviationRecord {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub region: Scope<String>,
    pub year: Scope<i32>,
    /// Reference unit-years compared.
    pub n_units: usize,
    /// Total reference events over those units.
    pub n_reference: u64,
    /// Total predicted events over those units.
    pub n_predicted: u64,
    pub mae: f64,
    /// mae / mean(n_reference).
    pub relative_mae: Option<f64>,
    /// Mean (n_predicted - n_reference); positive means over-detection.
    pub bias: f64,
    pub mse: f64,
    pub rmse: f64,
    /// rmse / mean(n_reference).
    pub relative_rmse: Option<f64>,
    /// Mean |difference / n_reference|; undefined if any unit has no
    /// reference events.
    pub mape: Option<f64>,
}

type UnitKey = (Submission, String, i32, String);

/// Left-join predicted counts onto reference counts for every submission.
///
/// Rows are ordered by submission, region, year, unit. Predictions on
/// units without reference events are not counted.
pub fn unit_counts(reference: &[ReferenceEvent], predictions: &[PredictedEvent]) -> Vec<UnitCount> {
    let mut per_unit: BTreeMap<(String, i32, String), u64> = BTreeMap::new();
    for r in reference {
        *per_unit
            .entry((r.region.clone(), r.year, r.unit_id.clone()))
            .or_insert(0) += 1;
    }

    let mut submissions: BTreeSet<Submission> = BTreeSet::new();
    let mut predicted: BTreeMap<UnitKey, u64> = BTreeMap::new();
    for p in predictions {
        let submission = p.submission();
        *predicted
            .entry((submission.clone(), p.region.clone(), p.year, p.unit_id.clone()))
            .or_insert(0) += 1;
        submissions.insert(submission);
    }

    let mut expected: BTreeMap<UnitKey, u64> = BTreeMap::new();
    for submission in &submissions {
        for ((region, year, unit_id), &n) in &per_unit {
            expected.insert((submission.clone(), region.clone(), *year, unit_id.clone()), n);
        }
    }

    left_join(&expected, &predicted, 0)
        .into_iter()
        .map(|((submission, region, year, unit_id), (n_reference, n_predicted))| UnitCount {
            group_id: submission.group_id,
            method: submission.method,
            data_source: submission.data_source,
            region,
            unit_id,
            year,
            n_reference,
            n_predicted,
        })
        .collect()
}

/// Per-unit samples of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
struct CountSamples {
    differences: Vec<f64>,
    references: Vec<f64>,
    n_predicted: u64,
}

impl Combine for CountSamples {
    fn combine(&mut self, other: &Self) {
        self.differences.extend_from_slice(&other.differences);
        self.references.extend_from_slice(&other.references);
        self.n_predicted += other.n_predicted;
    }
}

/// Compute count error statistics per cell and roll-up.
pub fn count_deviation(reference: &[ReferenceEvent], predictions: &[PredictedEvent]) -> Vec<CountDeviationRecord> {
    let mut cells: BTreeMap<CellKey, CountSamples> = BTreeMap::new();
    for unit in unit_counts(reference, predictions) {
        let submission = Submission::new(unit.group_id.as_str(), unit.method.as_str(), unit.data_source.as_str());
        let samples = cells
            .entry(CellKey::new(submission, unit.region.as_str(), unit.year))
            .or_default();
        samples.differences.push(unit.difference() as f64);
        samples.references.push(unit.n_reference as f64);
        samples.n_predicted += unit.n_predicted;
    }

    with_roll_ups(cells)
        .iter()
        .filter_map(|(key, samples)| {
            let summary = ErrorSummary::from_differences(&samples.differences)?;
            let n_reference: f64 = samples.references.iter().sum();
            let mean_reference = n_reference / summary.n as f64;
            Some(CountDeviationRecord {
                group_id: key.submission.group_id.clone(),
                method: key.submission.method.clone(),
                data_source: key.submission.data_source.clone(),
                region: key.region.clone(),
                year: key.year.clone(),
                n_units: summary.n,
                n_reference: n_reference as u64,
                n_predicted: samples.n_predicted,
                mae: summary.mae,
                relative_mae: safe_ratio(summary.mae, mean_reference),
                bias: summary.bias,
                mse: summary.mse,
                rmse: summary.rmse,
                relative_rmse: safe_ratio(summary.rmse, mean_reference),
                mape: mean_absolute_percentage_error(&samples.differences, &samples.references),
            })
        })
        .collect()
}
