//! Classification counts and Recall / Precision / F1.

use mw_common::{PredictedEvent, ReferenceEvent, Scope, Submission};
use mw_math::{count_ratio, count_ratio_or, f1_score};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{full_outer_join, with_roll_ups, CellKey, Combine};
use crate::matching::MatchedPair;

/// Classification outcome of one submission in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AccuracyRecord {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub region: Scope<String>,
    pub year: Scope<i32>,
    /// Reference events.
    #[serde(rename = "T")]
    pub t: u64,
    /// Predicted events.
    #[serde(rename = "P")]
    pub p: u64,
    #[serde(rename = "TP")]
    pub tp: u64,
    #[serde(rename = "FP")]
    pub fp: u64,
    /// TP / T; undefined without reference events.
    #[serde(rename = "Recall")]
    pub recall: Option<f64>,
    /// TP / P; 0 without predictions.
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "F1")]
    pub f1: Option<f64>,
}

impl AccuracyRecord {
    fn from_counts(key: &CellKey, counts: &ClassCounts) -> Self {
        let recall = count_ratio(counts.tp, counts.t);
        let precision = count_ratio_or(counts.tp, counts.p, 0.0);
        AccuracyRecord {
            group_id: key.submission.group_id.clone(),
            method: key.submission.method.clone(),
            data_source: key.submission.data_source.clone(),
            region: key.region.clone(),
            year: key.year.clone(),
            t: counts.t,
            p: counts.p,
            tp: counts.tp,
            fp: counts.p.saturating_sub(counts.tp),
            recall,
            precision,
            f1: f1_score(precision, recall),
        }
    }

    pub fn submission(&self) -> Submission {
        Submission::new(&self.group_id, &self.method, &self.data_source)
    }
}

/// Summable classification counts of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ClassCounts {
    t: u64,
    p: u64,
    tp: u64,
}

impl Combine for ClassCounts {
    fn combine(&mut self, other: &Self) {
        self.t += other.t;
        self.p += other.p;
        self.tp += other.tp;
    }
}

/// Count T, P and TP per (submission, region, year) and derive the ratios.
///
/// Every submission gets a row for every (region, year) of the reference
/// and of its own predictions, zero-filled where it has no data. A
/// prediction nearest to several reference events is counted as a true
/// positive once.
pub fn aggregate_accuracy(
    reference: &[ReferenceEvent],
    predictions: &[PredictedEvent],
    pairs: &[MatchedPair],
    tolerance: u32,
) -> Vec<AccuracyRecord> {
    let mut truth: BTreeMap<(&str, i32), u64> = BTreeMap::new();
    for r in reference {
        *truth.entry((r.region.as_str(), r.year)).or_insert(0) += 1;
    }

    let mut submissions: BTreeSet<Submission> = BTreeSet::new();
    let mut predicted: BTreeMap<CellKey, u64> = BTreeMap::new();
    for p in predictions {
        let submission = p.submission();
        *predicted
            .entry(CellKey::new(submission.clone(), p.region.as_str(), p.year))
            .or_insert(0) += 1;
        submissions.insert(submission);
    }

    let mut credited: HashSet<usize> = HashSet::new();
    let mut hits: BTreeMap<CellKey, u64> = BTreeMap::new();
    for pair in pairs.iter().filter(|p| p.is_true_positive(tolerance)) {
        if credited.insert(pair.prediction_index) {
            *hits
                .entry(CellKey::new(pair.submission(), pair.region.as_str(), pair.year))
                .or_insert(0) += 1;
        }
    }

    let mut expected: BTreeMap<CellKey, u64> = BTreeMap::new();
    for submission in &submissions {
        for (&(region, year), &t) in &truth {
            expected.insert(CellKey::new(submission.clone(), region, year), t);
        }
    }

    let counts = full_outer_join(&predicted, &hits, 0, 0);
    let cells: BTreeMap<CellKey, ClassCounts> = full_outer_join(&expected, &counts, 0, (0, 0))
        .into_iter()
        .map(|(key, (t, (p, tp)))| (key, ClassCounts { t, p, tp }))
        .collect();

    with_roll_ups(cells)
        .iter()
        .map(|(key, counts)| AccuracyRecord::from_counts(key, counts))
        .collect()
}
