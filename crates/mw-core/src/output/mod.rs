//! Tabular rendering of result records.
//!
//! Every record type exposes its columns through [`TableRow`], shared by the
//! Markdown and CSV writers. Undefined metrics render as `NA`; JSON output
//! goes through serde and keeps them as `null`.

pub mod markdown;
pub mod tables;

pub use markdown::{render_report, render_table};
pub use tables::{write_cleaned, write_report_tables, write_table};

use mw_common::{PredictedEvent, ReferenceEvent};

use crate::evaluate::{AccuracyRecord, CountDeviationRecord, RegressionMetricRecord, UnitCount};
use crate::matching::MatchedPair;

/// Text for an undefined metric.
pub const NA: &str = "NA";

/// How floating point cells are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Shortest representation that round-trips.
    Full,
    /// Fixed number of decimals.
    Fixed(usize),
}

impl NumberFormat {
    pub fn float(self, value: f64) -> String {
        match self {
            NumberFormat::Full => value.to_string(),
            NumberFormat::Fixed(decimals) => format!("{:.*}", decimals, value),
        }
    }

    pub fn optional(self, value: Option<f64>) -> String {
        value.map_or_else(|| NA.to_string(), |v| self.float(v))
    }
}

/// A record that renders as one table row.
pub trait TableRow {
    /// Header names, in cell order.
    const COLUMNS: &'static [&'static str];

    fn cells(&self, format: NumberFormat) -> Vec<String>;
}

impl TableRow for AccuracyRecord {
    const COLUMNS: &'static [&'static str] = &[
        "group_id",
        "method",
        "data_source",
        "region",
        "year",
        "T",
        "P",
        "TP",
        "FP",
        "Recall",
        "Precision",
        "F1",
    ];

    fn cells(&self, format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.to_string(),
            self.year.to_string(),
            self.t.to_string(),
            self.p.to_string(),
            self.tp.to_string(),
            self.fp.to_string(),
            format.optional(self.recall),
            format.float(self.precision),
            format.optional(self.f1),
        ]
    }
}

impl TableRow for RegressionMetricRecord {
    const COLUMNS: &'static [&'static str] = &[
        "group_id",
        "method",
        "data_source",
        "region",
        "year",
        "n",
        "mae",
        "bias",
        "correlation",
    ];

    fn cells(&self, format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.to_string(),
            self.year.to_string(),
            self.n.to_string(),
            format.float(self.mae),
            format.float(self.bias),
            format.optional(self.correlation),
        ]
    }
}

impl TableRow for CountDeviationRecord {
    const COLUMNS: &'static [&'static str] = &[
        "group_id",
        "method",
        "data_source",
        "region",
        "year",
        "n_units",
        "n_reference",
        "n_predicted",
        "mae",
        "relative_mae",
        "bias",
        "mse",
        "rmse",
        "relative_rmse",
        "mape",
    ];

    fn cells(&self, format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.to_string(),
            self.year.to_string(),
            self.n_units.to_string(),
            self.n_reference.to_string(),
            self.n_predicted.to_string(),
            format.float(self.mae),
            format.optional(self.relative_mae),
            format.float(self.bias),
            format.float(self.mse),
            format.float(self.rmse),
            format.optional(self.relative_rmse),
            format.optional(self.mape),
        ]
    }
}

impl TableRow for MatchedPair {
    const COLUMNS: &'static [&'static str] = &[
        "group_id",
        "method",
        "data_source",
        "region",
        "unit_id",
        "year",
        "reference_doy",
        "predicted_doy",
        "absolute_difference",
    ];

    fn cells(&self, _format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.clone(),
            self.unit_id.clone(),
            self.year.to_string(),
            self.reference_doy.to_string(),
            self.predicted_doy.to_string(),
            self.absolute_difference.to_string(),
        ]
    }
}

impl TableRow for UnitCount {
    const COLUMNS: &'static [&'static str] = &[
        "group_id",
        "method",
        "data_source",
        "region",
        "unit_id",
        "year",
        "n_reference",
        "n_predicted",
    ];

    fn cells(&self, _format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.clone(),
            self.unit_id.clone(),
            self.year.to_string(),
            self.n_reference.to_string(),
            self.n_predicted.to_string(),
        ]
    }
}

// Cleaned events are written with the input column names so they load back.
impl TableRow for ReferenceEvent {
    const COLUMNS: &'static [&'static str] = &crate::ingest::REFERENCE_COLUMNS;

    fn cells(&self, _format: NumberFormat) -> Vec<String> {
        vec![
            self.unit_id.clone(),
            self.year.to_string(),
            self.region.clone(),
            self.doy.to_string(),
        ]
    }
}

impl TableRow for PredictedEvent {
    const COLUMNS: &'static [&'static str] = &crate::ingest::PREDICTION_COLUMNS;

    fn cells(&self, _format: NumberFormat) -> Vec<String> {
        vec![
            self.group_id.clone(),
            self.method.clone(),
            self.data_source.clone(),
            self.region.clone(),
            self.unit_id.clone(),
            self.year.to_string(),
            self.doy.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_common::Scope;

    fn accuracy() -> AccuracyRecord {
        AccuracyRecord {
            group_id: "A".to_string(),
            method: "m".to_string(),
            data_source: "s".to_string(),
            region: Scope::All,
            year: Scope::Each(2021),
            t: 0,
            p: 2,
            tp: 0,
            fp: 2,
            recall: None,
            precision: 0.0,
            f1: None,
        }
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(NumberFormat::Full.float(0.5), "0.5");
        assert_eq!(NumberFormat::Fixed(3).float(2.0 / 3.0), "0.667");
        assert_eq!(NumberFormat::Fixed(3).optional(None), "NA");
    }

    #[test]
    fn test_accuracy_cells_match_columns() {
        let cells = accuracy().cells(NumberFormat::Full);
        assert_eq!(cells.len(), AccuracyRecord::COLUMNS.len());
        assert_eq!(cells[3], "All");
        assert_eq!(cells[4], "2021");
        assert_eq!(cells[9], "NA");
        assert_eq!(cells[10], "0");
    }

    #[test]
    fn test_event_rows_use_input_columns() {
        let event = ReferenceEvent {
            unit_id: "7".to_string(),
            year: 2021,
            region: "north".to_string(),
            doy: 120,
        };
        assert_eq!(ReferenceEvent::COLUMNS, &["unit_id", "year", "region", "date"]);
        assert_eq!(event.cells(NumberFormat::Full), vec!["7", "2021", "north", "120"]);
    }
}
