//! Property-based tests for cleaning, matching and aggregation.

use mw_common::{PredictedEvent, ReferenceEvent};
use mw_config::EvalConfig;
use mw_core::{clean_predictions, clean_reference, match_events};
use mw_core::pipeline::evaluate;
use proptest::prelude::*;

fn region_of(unit: u8) -> String {
    if unit % 2 == 0 { "north" } else { "south" }.to_string()
}

fn reference_strategy() -> impl Strategy<Value = Vec<ReferenceEvent>> {
    prop::collection::vec((0u8..5, 2020i32..2023, 60u16..320), 0..16).prop_map(|rows| {
        rows.into_iter()
            .map(|(unit, year, doy)| ReferenceEvent {
                unit_id: unit.to_string(),
                year,
                region: region_of(unit),
                doy,
            })
            .collect()
    })
}

fn prediction_strategy() -> impl Strategy<Value = Vec<PredictedEvent>> {
    prop::collection::vec(
        (prop::sample::select(vec!["A", "B"]), 0u8..5, 2020i32..2023, 60u16..320),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(group, unit, year, doy)| PredictedEvent {
                group_id: group.to_string(),
                method: "m".to_string(),
                data_source: "s".to_string(),
                region: region_of(unit),
                unit_id: unit.to_string(),
                year,
                doy,
            })
            .collect()
    })
}

/// Cleaned reference and predictions under `config`.
fn cleaned(
    reference: Vec<ReferenceEvent>,
    predictions: Vec<PredictedEvent>,
    config: &EvalConfig,
) -> (Vec<ReferenceEvent>, Vec<PredictedEvent>) {
    let reference = clean_reference(reference, config).events;
    let predictions = clean_predictions(predictions, &reference, config).events;
    (reference, predictions)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reference_cleaning_is_idempotent(reference in reference_strategy()) {
        let config = EvalConfig::default();
        let once = clean_reference(reference, &config);
        let twice = clean_reference(once.events.clone(), &config);
        prop_assert_eq!(&twice.events, &once.events);
        prop_assert_eq!(twice.stats.dropped(), 0);
    }

    #[test]
    fn prediction_cleaning_is_idempotent(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let reference = clean_reference(reference, &config).events;
        let once = clean_predictions(predictions, &reference, &config);
        let twice = clean_predictions(once.events.clone(), &reference, &config);
        prop_assert_eq!(&twice.events, &once.events);
    }

    #[test]
    fn cleaned_reference_respects_range_and_spacing(reference in reference_strategy()) {
        let config = EvalConfig::default();
        let kept = clean_reference(reference, &config).events;
        for (i, a) in kept.iter().enumerate() {
            prop_assert!(config.valid_range.contains(a.doy));
            for b in &kept[i + 1..] {
                if a.unit_id == b.unit_id && a.year == b.year {
                    let gap = u32::from(a.doy.abs_diff(b.doy));
                    prop_assert!(gap >= config.event_min_difference);
                }
            }
        }
    }

    #[test]
    fn one_match_per_reference_and_submission(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let (reference, predictions) = cleaned(reference, predictions, &EvalConfig::default());
        let pairs = match_events(&reference, &predictions);
        let mut seen = std::collections::HashSet::new();
        for pair in &pairs {
            prop_assert!(seen.insert((pair.reference_index, pair.submission())));
            let reference_event = &reference[pair.reference_index];
            let prediction = &predictions[pair.prediction_index];
            prop_assert_eq!(&prediction.unit_id, &reference_event.unit_id);
            prop_assert_eq!(prediction.year, reference_event.year);
            // nothing in the same unit-year and submission is closer
            for other in &predictions {
                if other.submission() == pair.submission()
                    && other.unit_id == reference_event.unit_id
                    && other.year == reference_event.year
                {
                    prop_assert!(other.doy.abs_diff(reference_event.doy) >= pair.absolute_difference);
                }
            }
        }
    }

    #[test]
    fn accuracy_counts_are_consistent(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &config);
        let evaluation = evaluate(&reference, &predictions, &config);
        for row in &evaluation.accuracy {
            prop_assert!(row.tp <= row.t.min(row.p));
            prop_assert_eq!(row.fp, row.p - row.tp);
            prop_assert!((0.0..=1.0).contains(&row.precision));
            if let Some(recall) = row.recall {
                prop_assert!((0.0..=1.0).contains(&recall));
            }
        }
    }

    #[test]
    fn wider_tolerance_never_loses_true_positives(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
        narrow in 0u32..30,
        extra in 0u32..30,
    ) {
        let base = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &base);
        let tight = evaluate(&reference, &predictions, &base.clone().with_tolerance(narrow));
        let loose = evaluate(&reference, &predictions, &base.with_tolerance(narrow + extra));
        prop_assert_eq!(tight.accuracy.len(), loose.accuracy.len());
        for (t, l) in tight.accuracy.iter().zip(&loose.accuracy) {
            prop_assert_eq!(&t.group_id, &l.group_id);
            prop_assert!(t.tp <= l.tp);
            prop_assert!(t.fp >= l.fp);
        }
    }

    #[test]
    fn region_roll_up_equals_sum_over_regions(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &config);
        let evaluation = evaluate(&reference, &predictions, &config);
        for rolled in evaluation.accuracy.iter().filter(|r| r.region.is_all() && !r.year.is_all()) {
            let cells = evaluation.accuracy.iter().filter(|r| {
                r.submission() == rolled.submission() && r.year == rolled.year && !r.region.is_all()
            });
            let (p, tp, fp) = cells.fold((0, 0, 0), |acc, r| (acc.0 + r.p, acc.1 + r.tp, acc.2 + r.fp));
            prop_assert_eq!((rolled.p, rolled.tp, rolled.fp), (p, tp, fp));
        }
    }

    #[test]
    fn grand_total_equals_sum_of_cells(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &config);
        let evaluation = evaluate(&reference, &predictions, &config);
        for total in evaluation.accuracy.iter().filter(|r| r.region.is_all() && r.year.is_all()) {
            let cells = evaluation.accuracy.iter().filter(|r| {
                r.submission() == total.submission() && !r.region.is_all() && !r.year.is_all()
            });
            let (t, p, tp) = cells.fold((0, 0, 0), |acc, r| (acc.0 + r.t, acc.1 + r.p, acc.2 + r.tp));
            prop_assert_eq!((total.t, total.p, total.tp), (t, p, tp));
            prop_assert_eq!(total.t, reference.len() as u64);
        }
    }

    #[test]
    fn count_totals_cover_every_reference_event(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &config);
        let evaluation = evaluate(&reference, &predictions, &config);
        for total in evaluation.count_deviation.iter().filter(|r| r.region.is_all() && r.year.is_all()) {
            prop_assert_eq!(total.n_reference, reference.len() as u64);
            prop_assert!(total.mae >= total.bias.abs() - 1e-9);
            prop_assert!(total.rmse >= total.mae - 1e-9);
        }
    }

    #[test]
    fn evaluation_is_deterministic(
        reference in reference_strategy(),
        predictions in prediction_strategy(),
    ) {
        let config = EvalConfig::default();
        let (reference, predictions) = cleaned(reference, predictions, &config);
        let first = evaluate(&reference, &predictions, &config);
        let second = evaluate(&reference, &predictions, &config);
        prop_assert_eq!(first, second);
    }
}
