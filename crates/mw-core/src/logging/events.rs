//! Structured event vocabulary for logging.
//!
//! Every pipeline event carries the run's correlation id and its stage.

use serde::{Deserialize, Serialize};

/// Processing stages of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// CSV reading and parsing.
    Load,
    /// Range, spacing, duplicate, and region/year filtering.
    Clean,
    /// Nearest-neighbour event matching.
    Match,
    /// Classification counts and ratios.
    Classify,
    /// Date regression metrics.
    Regress,
    /// Event count deviation metrics.
    Count,
    /// Rendering and writing output tables.
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Clean => "clean",
            Stage::Match => "match",
            Stage::Classify => "classify",
            Stage::Regress => "regress",
            Stage::Count => "count",
            Stage::Output => "output",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";

    pub const LOAD_MALFORMED_ROW: &str = "load.malformed_row";
    pub const LOAD_FINISHED: &str = "load.finished";

    pub const CLEAN_SPACING_VIOLATION: &str = "clean.spacing_violation";
    pub const CLEAN_FINISHED: &str = "clean.finished";

    pub const MATCH_FINISHED: &str = "match.finished";

    pub const CLASSIFY_FINISHED: &str = "classify.finished";
    pub const REGRESS_FINISHED: &str = "regress.finished";
    pub const COUNT_FINISHED: &str = "count.finished";

    pub const METRIC_UNDEFINED: &str = "metric.undefined";
    pub const RUN_WARNING: &str = "run.warning";

    pub const OUTPUT_WRITTEN: &str = "output.written";
}

/// Correlation context shared by all events of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}
