//! Mowing Event Evaluation Core Library
//!
//! This library evaluates predicted mowing events against reference
//! ground truth:
//! - Loading and cleaning of reference and prediction tables
//! - Nearest-neighbour event matching
//! - Classification, date regression and count deviation metrics with
//!   region / year roll-ups
//! - Report rendering as JSON, Markdown and CSV
//!
//! The binary entry point is in `main.rs`.

pub mod evaluate;
pub mod exit_codes;
pub mod ingest;
pub mod logging;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod schema;

pub use evaluate::{
    aggregate_accuracy, count_deviation, regression_metrics, unit_counts, AccuracyRecord,
    CountDeviationRecord, RegressionMetricRecord, UnitCount,
};
pub use ingest::{clean_predictions, clean_reference, load_predictions, load_reference, LoadStats, Loaded};
pub use matching::{match_events, MatchedPair};
pub use pipeline::{evaluate, run_evaluation, Evaluation, EvaluationReport, EvaluationRequest, Warning};
