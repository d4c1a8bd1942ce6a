//! JSON Schema generation for input and output record types.
//!
//! ```bash
//! # List available schema types
//! mw-eval schema --list
//!
//! # Generate schema for a specific type
//! mw-eval schema AccuracyRecord
//!
//! # Generate all schemas
//! mw-eval schema
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::evaluate::{AccuracyRecord, CountDeviationRecord, RegressionMetricRecord, UnitCount};
pub use crate::ingest::LoadStats;
pub use crate::matching::MatchedPair;
pub use crate::pipeline::{LoadSummary, Warning};
pub use mw_common::{PredictedEvent, ReferenceEvent, Submission};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Inputs
        ("ReferenceEvent", "One ground-truth mowing event"),
        ("PredictedEvent", "One submitted mowing detection"),
        ("Submission", "Group, method and data source of a prediction set"),
        // Intermediate
        ("MatchedPair", "Reference event with its nearest prediction"),
        ("UnitCount", "Reference and predicted event counts of a unit-year"),
        ("LoadStats", "Row accounting of one input table"),
        ("LoadSummary", "Row accounting of both inputs"),
        // Results
        ("AccuracyRecord", "T, P, TP, FP with Recall, Precision and F1"),
        ("RegressionMetricRecord", "Date MAE, bias and correlation"),
        ("CountDeviationRecord", "Per-unit event count error statistics"),
        ("Warning", "Non-fatal condition reported alongside the tables"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns `None` if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "ReferenceEvent" => schema_for!(ReferenceEvent),
        "PredictedEvent" => schema_for!(PredictedEvent),
        "Submission" => schema_for!(Submission),
        "MatchedPair" => schema_for!(MatchedPair),
        "UnitCount" => schema_for!(UnitCount),
        "LoadStats" => schema_for!(LoadStats),
        "LoadSummary" => schema_for!(LoadSummary),
        "AccuracyRecord" => schema_for!(AccuracyRecord),
        "RegressionMetricRecord" => schema_for!(RegressionMetricRecord),
        "CountDeviationRecord" => schema_for!(CountDeviationRecord),
        "Warning" => schema_for!(Warning),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}
