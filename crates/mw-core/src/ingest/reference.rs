//! Reference (ground-truth) event loading and cleaning.

use mw_common::{ReferenceEvent, Result};
use mw_config::EvalConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::{parse_doy, parse_year, read_rows, LoadStats, Loaded};
use crate::logging::event_names;

/// Required reference columns, in the order they are written back out.
pub const REFERENCE_COLUMNS: [&str; 4] = ["unit_id", "year", "region", "date"];

/// Read and clean a reference CSV.
pub fn load_reference(path: &Path, config: &EvalConfig) -> Result<Loaded<ReferenceEvent>> {
    let (events, parsed) = read_rows(path, &REFERENCE_COLUMNS, |v| {
        let year = parse_year(v[1])?;
        let doy = parse_doy(v[3], year)?;
        Ok(ReferenceEvent {
            unit_id: v[0].to_string(),
            year,
            region: v[2].to_string(),
            doy,
        })
    })?;

    let cleaned = clean_reference(events, config);
    Ok(Loaded {
        stats: parsed.with_cleaning(&cleaned.stats),
        events: cleaned.events,
    })
}

/// Apply the valid-range filter and the minimum-spacing rule.
///
/// Spacing is checked per (unit_id, year) on the range-filtered events,
/// sorted by day. A group with any adjacent pair closer than
/// `event_min_difference` days is removed entirely. Survivors keep their
/// input order.
pub fn clean_reference(events: Vec<ReferenceEvent>, config: &EvalConfig) -> Loaded<ReferenceEvent> {
    let mut stats = LoadStats {
        rows_read: events.len(),
        ..LoadStats::default()
    };

    let in_range: Vec<ReferenceEvent> = events
        .into_iter()
        .filter(|e| config.valid_range.contains(e.doy))
        .collect();
    stats.out_of_range = stats.rows_read - in_range.len();

    // Pass 1: collect days per group and mark violators.
    let mut groups: BTreeMap<(&str, i32), Vec<u16>> = BTreeMap::new();
    for event in &in_range {
        groups
            .entry((event.unit_id.as_str(), event.year))
            .or_default()
            .push(event.doy);
    }
    let min_difference = config.event_min_difference;
    let mut violating: BTreeSet<(String, i32)> = BTreeSet::new();
    for ((unit_id, year), days) in groups.iter_mut() {
        days.sort_unstable();
        let too_close = days
            .windows(2)
            .any(|w| u32::from(w[1] - w[0]) < min_difference);
        if too_close {
            tracing::debug!(
                target: event_names::CLEAN_SPACING_VIOLATION,
                unit_id = %unit_id,
                year = *year,
                events = days.len(),
                "discarding reference group with events closer than minimum spacing"
            );
            violating.insert((unit_id.to_string(), *year));
        }
    }
    drop(groups);

    // Pass 2: drop every row of a marked group.
    let before = in_range.len();
    let kept: Vec<ReferenceEvent> = in_range
        .into_iter()
        .filter(|e| !violating.contains(&(e.unit_id.clone(), e.year)))
        .collect();

    stats.spacing_groups_removed = violating.len();
    stats.spacing_rows_removed = before - kept.len();
    stats.retained = kept.len();

    Loaded {
        events: kept,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_config::DoyRange;
    use std::io::Write;

    fn ev(unit: &str, year: i32, region: &str, doy: u16) -> ReferenceEvent {
        ReferenceEvent {
            unit_id: unit.to_string(),
            year,
            region: region.to_string(),
            doy,
        }
    }

    #[test]
    fn test_close_events_drop_whole_group() {
        let events = vec![ev("1", 2021, "n", 100), ev("1", 2021, "n", 110), ev("2", 2021, "n", 100)];
        let cleaned = clean_reference(events, &EvalConfig::default());
        assert_eq!(cleaned.events, vec![ev("2", 2021, "n", 100)]);
        assert_eq!(cleaned.stats.spacing_groups_removed, 1);
        assert_eq!(cleaned.stats.spacing_rows_removed, 2);
    }

    #[test]
    fn test_spacing_exactly_minimum_is_kept() {
        let events = vec![ev("1", 2021, "n", 130), ev("1", 2021, "n", 100), ev("1", 2021, "n", 115)];
        let cleaned = clean_reference(events.clone(), &EvalConfig::default());
        assert_eq!(cleaned.events, events);
    }

    #[test]
    fn test_spacing_is_per_year() {
        let events = vec![ev("1", 2021, "n", 100), ev("1", 2022, "n", 105)];
        let cleaned = clean_reference(events.clone(), &EvalConfig::default());
        assert_eq!(cleaned.events, events);
    }

    #[test]
    fn test_duplicate_reference_rows_violate_spacing() {
        let events = vec![ev("1", 2021, "n", 100), ev("1", 2021, "n", 100)];
        let cleaned = clean_reference(events, &EvalConfig::default());
        assert!(cleaned.events.is_empty());
    }

    #[test]
    fn test_range_filter_runs_before_spacing() {
        // 70 is out of range; without it the group is well spaced.
        let events = vec![ev("1", 2021, "n", 70), ev("1", 2021, "n", 80)];
        let cleaned = clean_reference(events, &EvalConfig::default());
        assert_eq!(cleaned.events, vec![ev("1", 2021, "n", 80)]);
        assert_eq!(cleaned.stats.out_of_range, 1);
        assert_eq!(cleaned.stats.spacing_groups_removed, 0);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let config = EvalConfig::default().with_valid_range(DoyRange::new(100, 200));
        let events = vec![ev("1", 2021, "n", 99), ev("2", 2021, "n", 100), ev("3", 2021, "n", 200), ev("4", 2021, "n", 201)];
        let cleaned = clean_reference(events, &config);
        let units: Vec<&str> = cleaned.events.iter().map(|e| e.unit_id.as_str()).collect();
        assert_eq!(units, vec!["2", "3"]);
    }

    #[test]
    fn test_zero_min_spacing_keeps_duplicates() {
        let config = EvalConfig::default().with_event_min_difference(0);
        let events = vec![ev("1", 2021, "n", 100), ev("1", 2021, "n", 100)];
        assert_eq!(clean_reference(events, &config).events.len(), 2);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let events = vec![
            ev("1", 2021, "n", 100),
            ev("1", 2021, "n", 140),
            ev("2", 2021, "s", 60),
            ev("3", 2021, "s", 200),
            ev("3", 2021, "s", 205),
        ];
        let config = EvalConfig::default();
        let once = clean_reference(events, &config);
        let twice = clean_reference(once.events.clone(), &config);
        assert_eq!(once.events, twice.events);
        assert_eq!(twice.stats.dropped(), 0);
    }

    #[test]
    fn test_load_reference_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "region,unit_id,year,date,note").unwrap();
        writeln!(file, "north,1,2021,100,").unwrap();
        writeln!(file, "north,2,2021,2021-05-20,x").unwrap();
        writeln!(file, "north,3,2021,,x").unwrap();
        writeln!(file, "north,4,20x1,100,x").unwrap();
        writeln!(file, "south,5,2021,30,x").unwrap();
        file.flush().unwrap();

        let loaded = load_reference(file.path(), &EvalConfig::default()).unwrap();
        assert_eq!(
            loaded.events,
            vec![ev("1", 2021, "north", 100), ev("2", 2021, "north", 140)]
        );
        assert_eq!(loaded.stats.rows_read, 5);
        assert_eq!(loaded.stats.missing_fields, 1);
        assert_eq!(loaded.stats.malformed, 1);
        assert_eq!(loaded.stats.out_of_range, 1);
        assert_eq!(loaded.stats.retained, 2);
    }

    #[test]
    fn test_load_reference_missing_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unit_id,year,date").unwrap();
        writeln!(file, "1,2021,100").unwrap();
        file.flush().unwrap();

        let err = load_reference(file.path(), &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, mw_common::Error::SchemaViolation { .. }));
    }
}
