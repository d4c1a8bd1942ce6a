//! Predicted event loading and cleaning.

use mw_common::{PredictedEvent, ReferenceEvent, Result};
use mw_config::EvalConfig;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use super::{parse_doy, parse_year, read_rows, LoadStats, Loaded};

/// Required prediction columns, in the order they are written back out.
pub const PREDICTION_COLUMNS: [&str; 7] = [
    "group_id",
    "method",
    "data_source",
    "region",
    "unit_id",
    "year",
    "date",
];

/// Read and clean a prediction CSV against an already cleaned reference.
pub fn load_predictions(
    path: &Path,
    reference: &[ReferenceEvent],
    config: &EvalConfig,
) -> Result<Loaded<PredictedEvent>> {
    let (events, parsed) = read_rows(path, &PREDICTION_COLUMNS, |v| {
        let year = parse_year(v[5])?;
        let doy = parse_doy(v[6], year)?;
        Ok(PredictedEvent {
            group_id: v[0].to_string(),
            method: v[1].to_string(),
            data_source: v[2].to_string(),
            region: v[3].to_string(),
            unit_id: v[4].to_string(),
            year,
            doy,
        })
    })?;

    let cleaned = clean_predictions(events, reference, config);
    Ok(Loaded {
        stats: parsed.with_cleaning(&cleaned.stats),
        events: cleaned.events,
    })
}

/// Deduplicate, range-filter and restrict predictions to reference cells.
///
/// Exact duplicates keep their first occurrence. Only predictions whose
/// (region, year) appears in `reference` survive.
pub fn clean_predictions(
    events: Vec<PredictedEvent>,
    reference: &[ReferenceEvent],
    config: &EvalConfig,
) -> Loaded<PredictedEvent> {
    let mut stats = LoadStats {
        rows_read: events.len(),
        ..LoadStats::default()
    };

    let mut seen: HashSet<PredictedEvent> = HashSet::with_capacity(events.len());
    let mut unique = Vec::with_capacity(events.len());
    for event in events {
        if seen.contains(&event) {
            stats.duplicates += 1;
            continue;
        }
        seen.insert(event.clone());
        unique.push(event);
    }

    let in_range: Vec<PredictedEvent> = unique
        .into_iter()
        .filter(|e| config.valid_range.contains(e.doy))
        .collect();
    stats.out_of_range = stats.rows_read - stats.duplicates - in_range.len();

    let cells: BTreeSet<(&str, i32)> = reference
        .iter()
        .map(|r| (r.region.as_str(), r.year))
        .collect();
    let before = in_range.len();
    let kept: Vec<PredictedEvent> = in_range
        .into_iter()
        .filter(|e| cells.contains(&(e.region.as_str(), e.year)))
        .collect();
    stats.outside_reference_cells = before - kept.len();
    stats.retained = kept.len();

    Loaded {
        events: kept,
        stats,
    }
}
