//! Nearest-neighbour matching of predicted to reference events.
//!
//! Predictions are indexed by (unit_id, year, region). For each reference
//! event, every submission with at least one candidate in that key gets
//! exactly one pair: its candidate closest in day of year. Ties go to the
//! candidate that appears first in the prediction table.

use mw_common::{PredictedEvent, ReferenceEvent, Submission};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reference event paired with one submission's nearest prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchedPair {
    pub unit_id: String,
    pub year: i32,
    pub region: String,
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub reference_doy: u16,
    pub predicted_doy: u16,
    pub absolute_difference: u16,
    /// Row of the reference event in the cleaned reference table.
    pub reference_index: usize,
    /// Row of the prediction in the cleaned prediction table.
    pub prediction_index: usize,
}

impl MatchedPair {
    pub fn submission(&self) -> Submission {
        Submission::new(&self.group_id, &self.method, &self.data_source)
    }

    /// Within `tolerance` days of the reference event.
    pub fn is_true_positive(&self, tolerance: u32) -> bool {
        u32::from(self.absolute_difference) <= tolerance
    }

    /// predicted - reference, in days.
    pub fn signed_difference(&self) -> i32 {
        i32::from(self.predicted_doy) - i32::from(self.reference_doy)
    }
}

type CandidateKey<'a> = (&'a str, i32, &'a str);
type SubmissionKey<'a> = (&'a str, &'a str, &'a str);

fn submission_key(p: &PredictedEvent) -> SubmissionKey<'_> {
    (p.group_id.as_str(), p.method.as_str(), p.data_source.as_str())
}

/// Match every reference event against every submission's candidates.
///
/// Output is ordered by reference row, then by the order in which each
/// submission first appears among that event's candidates.
pub fn match_events(reference: &[ReferenceEvent], predictions: &[PredictedEvent]) -> Vec<MatchedPair> {
    let mut candidates: HashMap<CandidateKey<'_>, Vec<usize>> = HashMap::new();
    for (idx, p) in predictions.iter().enumerate() {
        candidates
            .entry((p.unit_id.as_str(), p.year, p.region.as_str()))
            .or_default()
            .push(idx);
    }

    let mut pairs = Vec::new();
    let mut nearest: Vec<(SubmissionKey<'_>, usize, u16)> = Vec::new();
    for (ref_idx, r) in reference.iter().enumerate() {
        let Some(list) = candidates.get(&(r.unit_id.as_str(), r.year, r.region.as_str())) else {
            continue;
        };

        nearest.clear();
        for &pred_idx in list {
            let p = &predictions[pred_idx];
            let key = submission_key(p);
            let diff = p.doy.abs_diff(r.doy);
            match nearest.iter_mut().find(|(k, _, _)| *k == key) {
                Some(best) => {
                    if diff < best.2 {
                        best.1 = pred_idx;
                        best.2 = diff;
                    }
                }
                None => nearest.push((key, pred_idx, diff)),
            }
        }

        for &(_, pred_idx, diff) in &nearest {
            let p = &predictions[pred_idx];
            pairs.push(MatchedPair {
                unit_id: r.unit_id.clone(),
                year: r.year,
                region: r.region.clone(),
                group_id: p.group_id.clone(),
                method: p.method.clone(),
                data_source: p.data_source.clone(),
                reference_doy: r.doy,
                predicted_doy: p.doy,
                absolute_difference: diff,
                reference_index: ref_idx,
                prediction_index: pred_idx,
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(unit: &str, doy: u16) -> ReferenceEvent {
        ReferenceEvent {
            unit_id: unit.to_string(),
            year: 2021,
            region: "north".to_string(),
            doy,
        }
    }

    fn pred(group: &str, unit: &str, doy: u16) -> PredictedEvent {
        PredictedEvent {
            group_id: group.to_string(),
            method: "m".to_string(),
            data_source: "s".to_string(),
            region: "north".to_string(),
            unit_id: unit.to_string(),
            year: 2021,
            doy,
        }
    }

    #[test]
    fn test_nearest_prediction_selected() {
        let pairs = match_events(&[reference("1", 100)], &[pred("A", "1", 105), pred("A", "1", 130)]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].predicted_doy, 105);
        assert_eq!(pairs[0].absolute_difference, 5);
        assert_eq!(pairs[0].prediction_index, 0);
        assert!(pairs[0].is_true_positive(12));
        assert_eq!(pairs[0].signed_difference(), 5);
    }

    #[test]
    fn test_tie_goes_to_first_prediction() {
        let pairs = match_events(&[reference("1", 100)], &[pred("A", "1", 110), pred("A", "1", 90)]);
        assert_eq!(pairs[0].predicted_doy, 110);
        assert_eq!(pairs[0].prediction_index, 0);
    }

    #[test]
    fn test_one_pair_per_submission() {
        let preds = [pred("B", "1", 140), pred("A", "1", 101), pred("B", "1", 99)];
        let pairs = match_events(&[reference("1", 100)], &preds);
        let groups: Vec<(&str, u16)> = pairs
            .iter()
            .map(|p| (p.group_id.as_str(), p.predicted_doy))
            .collect();
        assert_eq!(groups, vec![("B", 99), ("A", 101)]);
    }

    #[test]
    fn test_method_distinguishes_submissions() {
        let mut other = pred("A", "1", 150);
        other.method = "m2".to_string();
        let pairs = match_events(&[reference("1", 100)], &[pred("A", "1", 101), other]);
        assert_eq!(pairs.len(), 2);
        assert!(!pairs[1].is_true_positive(12));
    }

    #[test]
    fn test_no_candidates_no_pair() {
        let pairs = match_events(&[reference("1", 100)], &[pred("A", "2", 100)]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_region_is_part_of_key() {
        let mut p = pred("A", "1", 100);
        p.region = "south".to_string();
        assert!(match_events(&[reference("1", 100)], &[p]).is_empty());
    }

    #[test]
    fn test_prediction_can_pair_with_two_references() {
        let pairs = match_events(
            &[reference("1", 100), reference("1", 120)],
            &[pred("A", "1", 110)],
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].prediction_index, pairs[1].prediction_index);
        assert_eq!(pairs[1].reference_index, 1);
        assert_eq!(pairs[1].signed_difference(), -10);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let refs = [reference("1", 100), reference("2", 150)];
        let preds = [pred("A", "1", 95), pred("B", "2", 160), pred("A", "2", 140), pred("B", "1", 105)];
        assert_eq!(match_events(&refs, &preds), match_events(&refs, &preds));
    }
}
