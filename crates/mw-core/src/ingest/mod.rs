//! Loading and cleaning of reference and prediction tables.
//!
//! Loaders read a CSV file, parse every row into an event record and pass
//! the parsed events through the pure cleaners. Row-level problems never
//! abort a load: they are counted in [`LoadStats`] and the row is dropped.
//! Only a missing required column or an unreadable file is fatal.

pub mod predictions;
pub mod reference;

pub use predictions::{clean_predictions, load_predictions, PREDICTION_COLUMNS};
pub use reference::{clean_reference, load_reference, REFERENCE_COLUMNS};

use chrono::{Datelike, NaiveDate};
use mw_common::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::logging::event_names;

/// Cell values treated as an absent field.
const MISSING_MARKERS: [&str; 4] = ["NA", "NaN", "null", "NULL"];

/// Events that survived loading and cleaning, with the bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub events: Vec<T>,
    pub stats: LoadStats,
}

/// Row accounting for one input table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoadStats {
    /// Data rows read from the file (header excluded).
    pub rows_read: usize,
    /// Rows with an unparseable date or year, or a wrong field count.
    pub malformed: usize,
    /// Rows with at least one empty required field.
    pub missing_fields: usize,
    /// Exact duplicate predictions collapsed into their first occurrence.
    pub duplicates: usize,
    /// Rows whose day of year lies outside the valid range.
    pub out_of_range: usize,
    /// Reference (unit, year) groups discarded for violating minimum spacing.
    pub spacing_groups_removed: usize,
    /// Reference rows removed with those groups.
    pub spacing_rows_removed: usize,
    /// Predictions for a (region, year) absent from the cleaned reference.
    pub outside_reference_cells: usize,
    /// Rows retained after cleaning.
    pub retained: usize,
}

impl LoadStats {
    /// Copy the cleaning counters of `cleaning` onto parse-time stats.
    pub fn with_cleaning(mut self, cleaning: &LoadStats) -> Self {
        self.duplicates = cleaning.duplicates;
        self.out_of_range = cleaning.out_of_range;
        self.spacing_groups_removed = cleaning.spacing_groups_removed;
        self.spacing_rows_removed = cleaning.spacing_rows_removed;
        self.outside_reference_cells = cleaning.outside_reference_cells;
        self.retained = cleaning.retained;
        self
    }

    /// Rows dropped for any reason.
    pub fn dropped(&self) -> usize {
        self.malformed
            + self.missing_fields
            + self.duplicates
            + self.out_of_range
            + self.spacing_rows_removed
            + self.outside_reference_cells
    }
}

/// Parse a `date` cell into a day of year.
///
/// Accepts an integral day of year (`140`, `140.0`) or an ISO calendar
/// date (`2021-05-20`). A calendar date must fall in `year`.
pub fn parse_doy(raw: &str, year: i32) -> std::result::Result<u16, String> {
    let raw = raw.trim();
    if let Some(value) = parse_integral(raw) {
        return u16::try_from(value)
            .ok()
            .filter(|doy| (1..=366).contains(doy))
            .ok_or_else(|| format!("day of year {} outside 1..=366", value));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("unparseable date '{}'", raw))?;
    if date.year() != year {
        return Err(format!("date {} does not fall in year {}", date, year));
    }
    // ordinal() is 1..=366
    Ok(date.ordinal() as u16)
}

/// Parse a `year` cell.
pub fn parse_year(raw: &str) -> std::result::Result<i32, String> {
    parse_integral(raw.trim())
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| format!("unparseable year '{}'", raw))
}

/// Integer or float with zero fractional part.
fn parse_integral(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_MARKERS.contains(&value)
}

pub(crate) fn csv_error(path: &Path, err: csv::Error) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::Csv {
            path: path.to_path_buf(),
            message,
        },
    }
}

/// Resolve the positions of `required` columns in a header record.
///
/// Matching ignores case and surrounding whitespace. Every missing column
/// is reported at once.
pub(crate) fn locate_columns(
    headers: &csv::StringRecord,
    required: &[&str],
    path: &Path,
) -> Result<Vec<usize>> {
    let names: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();
    let mut positions = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for column in required {
        match names.iter().position(|n| n == column) {
            Some(idx) => positions.push(idx),
            None => missing.push((*column).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::SchemaViolation {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(positions)
}

/// Read every data row of `path`, projecting `columns` and parsing each row.
///
/// `parse` receives the trimmed values of `columns`, in order, and returns
/// an error message for a malformed row. Rows with a missing value are
/// counted before `parse` is called.
pub(crate) fn read_rows<T, F>(path: &Path, columns: &[&str], parse: F) -> Result<(Vec<T>, LoadStats)>
where
    F: Fn(&[&str]) -> std::result::Result<T, String>,
{
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let positions = locate_columns(&headers, columns, path)?;

    let mut events = Vec::new();
    let mut stats = LoadStats::default();
    let mut record = csv::StringRecord::new();
    let mut line = 1usize;

    loop {
        line += 1;
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) if err.is_io_error() => return Err(csv_error(path, err)),
            Err(err) => {
                stats.rows_read += 1;
                stats.malformed += 1;
                tracing::debug!(
                    target: event_names::LOAD_MALFORMED_ROW,
                    file = %path.display(),
                    line,
                    reason = %err,
                    "dropping unreadable row"
                );
                continue;
            }
        }
        stats.rows_read += 1;

        if record.len() != headers.len() {
            stats.malformed += 1;
            tracing::debug!(
                target: event_names::LOAD_MALFORMED_ROW,
                file = %path.display(),
                line,
                fields = record.len(),
                expected = headers.len(),
                "dropping row with wrong field count"
            );
            continue;
        }

        let values: Vec<&str> = positions
            .iter()
            .map(|&idx| record.get(idx).unwrap_or(""))
            .collect();
        if values.iter().any(|v| is_missing(v)) {
            stats.missing_fields += 1;
            continue;
        }

        match parse(&values) {
            Ok(event) => events.push(event),
            Err(reason) => {
                stats.malformed += 1;
                tracing::debug!(
                    target: event_names::LOAD_MALFORMED_ROW,
                    file = %path.display(),
                    line,
                    reason = %reason,
                    "dropping malformed row"
                );
            }
        }
    }

    stats.retained = events.len();
    Ok((events, stats))
}
