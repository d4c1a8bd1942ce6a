//! End-to-end evaluation: load, clean, match, aggregate.
//!
//! [`evaluate`] is the pure core over already cleaned events. [`run_evaluation`]
//! wraps it with file loading, provenance metadata, warnings and logging.

use chrono::{DateTime, Utc};
use mw_common::{PredictedEvent, ReferenceEvent, Result};
use mw_config::{hash_file, ConfigSnapshot, EvalConfig, ResolvedConfig};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::evaluate::{
    aggregate_accuracy, count_deviation, regression_metrics, AccuracyRecord, CountDeviationRecord,
    RegressionMetricRecord,
};
use crate::ingest::{load_predictions, load_reference, LoadStats, Loaded};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::matching::{match_events, MatchedPair};

/// Cell labels listed per undefined-metric warning.
const MAX_WARNING_CELLS: usize = 10;

/// Non-fatal conditions surfaced next to the result tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Rows dropped because a date, year or field count was invalid.
    MalformedRecords { table: String, count: usize },
    /// Rows dropped because a required field was empty.
    MissingFields { table: String, count: usize },
    /// An input table has no rows left after cleaning.
    EmptyTable { table: String },
    /// A metric could not be computed for some rows and is reported as null.
    UndefinedMetric {
        table: String,
        metric: String,
        count: usize,
        /// First affected cells, as `group/method/source region year`.
        cells: Vec<String>,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MalformedRecords { table, count } => {
                write!(f, "{}: dropped {} malformed row(s)", table, count)
            }
            Warning::MissingFields { table, count } => {
                write!(f, "{}: dropped {} row(s) with missing fields", table, count)
            }
            Warning::EmptyTable { table } => write!(f, "{}: no rows left after cleaning", table),
            Warning::UndefinedMetric {
                table,
                metric,
                count,
                cells,
            } => {
                write!(f, "{}: {} undefined in {} row(s)", table, metric, count)?;
                if !cells.is_empty() {
                    write!(f, " ({}", cells.join("; "))?;
                    if *count > cells.len() {
                        write!(f, "; ...")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

/// Result tables of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub pairs: Vec<MatchedPair>,
    pub accuracy: Vec<AccuracyRecord>,
    pub regression: Vec<RegressionMetricRecord>,
    pub count_deviation: Vec<CountDeviationRecord>,
}

/// Match and aggregate cleaned events.
pub fn evaluate(
    reference: &[ReferenceEvent],
    predictions: &[PredictedEvent],
    config: &EvalConfig,
) -> Evaluation {
    let pairs = match_events(reference, predictions);
    let accuracy = aggregate_accuracy(reference, predictions, &pairs, config.tolerance);
    let regression = regression_metrics(&pairs, config.tolerance, config.metric_scope);
    let count_deviation = count_deviation(reference, predictions);
    Evaluation {
        pairs,
        accuracy,
        regression,
        count_deviation,
    }
}

fn cell_label(
    group: &str,
    method: &str,
    source: &str,
    region: &impl std::fmt::Display,
    year: &impl std::fmt::Display,
) -> String {
    format!("{}/{}/{} {} {}", group, method, source, region, year)
}

fn undefined_metric(table: &str, metric: &str, cells: Vec<String>) -> Option<Warning> {
    if cells.is_empty() {
        return None;
    }
    let count = cells.len();
    Some(Warning::UndefinedMetric {
        table: table.to_string(),
        metric: metric.to_string(),
        count,
        cells: cells.into_iter().take(MAX_WARNING_CELLS).collect(),
    })
}

impl Evaluation {
    /// One warning per (table, metric) with undefined values.
    pub fn undefined_metric_warnings(&self) -> Vec<Warning> {
        let accuracy_cells = |undefined: fn(&AccuracyRecord) -> bool| -> Vec<String> {
            self.accuracy
                .iter()
                .filter(|r| undefined(r))
                .map(|r| cell_label(&r.group_id, &r.method, &r.data_source, &r.region, &r.year))
                .collect()
        };
        let count_cells = |undefined: fn(&CountDeviationRecord) -> bool| -> Vec<String> {
            self.count_deviation
                .iter()
                .filter(|r| undefined(r))
                .map(|r| cell_label(&r.group_id, &r.method, &r.data_source, &r.region, &r.year))
                .collect()
        };
        let correlation_cells: Vec<String> = self
            .regression
            .iter()
            .filter(|r| r.correlation.is_none())
            .map(|r| cell_label(&r.group_id, &r.method, &r.data_source, &r.region, &r.year))
            .collect();

        [
            undefined_metric("accuracy", "Recall", accuracy_cells(|r| r.recall.is_none())),
            undefined_metric("accuracy", "F1", accuracy_cells(|r| r.f1.is_none())),
            undefined_metric("regression", "correlation", correlation_cells),
            undefined_metric(
                "count_deviation",
                "relative_mae",
                count_cells(|r| r.relative_mae.is_none()),
            ),
            undefined_metric(
                "count_deviation",
                "relative_rmse",
                count_cells(|r| r.relative_rmse.is_none()),
            ),
            undefined_metric("count_deviation", "mape", count_cells(|r| r.mape.is_none())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Warnings derived from one input table's load statistics.
pub fn load_warnings(table: &str, stats: &LoadStats) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if stats.malformed > 0 {
        warnings.push(Warning::MalformedRecords {
            table: table.to_string(),
            count: stats.malformed,
        });
    }
    if stats.missing_fields > 0 {
        warnings.push(Warning::MissingFields {
            table: table.to_string(),
            count: stats.missing_fields,
        });
    }
    if stats.retained == 0 {
        warnings.push(Warning::EmptyTable {
            table: table.to_string(),
        });
    }
    warnings
}

/// What to evaluate.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub reference: PathBuf,
    pub predictions: PathBuf,
    /// Include every matched pair in the report.
    pub include_matches: bool,
}

/// Input file provenance.
#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub path: PathBuf,
    pub sha256: String,
}

/// Provenance of a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub config: ConfigSnapshot,
    pub reference: InputFile,
    pub predictions: InputFile,
}

/// Row accounting of both inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LoadSummary {
    pub reference: LoadStats,
    pub predictions: LoadStats,
}

/// Everything one evaluation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub metadata: ReportMetadata,
    pub warnings: Vec<Warning>,
    pub load: LoadSummary,
    pub accuracy: Vec<AccuracyRecord>,
    pub regression: Vec<RegressionMetricRecord>,
    pub count_deviation: Vec<CountDeviationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchedPair>>,
}

/// Cleaned inputs of a run.
#[derive(Debug, Clone)]
pub struct CleanedInputs {
    pub reference: Loaded<ReferenceEvent>,
    pub predictions: Option<Loaded<PredictedEvent>>,
}

/// Load and clean the reference and, when given, the predictions.
pub fn load_inputs(
    reference: &Path,
    predictions: Option<&Path>,
    config: &EvalConfig,
    ctx: &LogContext,
) -> Result<CleanedInputs> {
    let reference = load_reference(reference, config)?;
    log_loaded(ctx, "reference", &reference.stats);

    let predictions = match predictions {
        Some(path) => {
            let loaded = load_predictions(path, &reference.events, config)?;
            log_loaded(ctx, "predictions", &loaded.stats);
            Some(loaded)
        }
        None => None,
    };

    Ok(CleanedInputs {
        reference,
        predictions,
    })
}

fn log_loaded(ctx: &LogContext, table: &str, stats: &LoadStats) {
    log_event!(
        ctx,
        INFO,
        event_names::LOAD_FINISHED,
        Stage::Load,
        "input loaded",
        table = table,
        rows_read = stats.rows_read,
        malformed = stats.malformed,
        missing_fields = stats.missing_fields
    );
    log_event!(
        ctx,
        INFO,
        event_names::CLEAN_FINISHED,
        Stage::Clean,
        "input cleaned",
        table = table,
        duplicates = stats.duplicates,
        out_of_range = stats.out_of_range,
        spacing_groups_removed = stats.spacing_groups_removed,
        outside_reference_cells = stats.outside_reference_cells,
        retained = stats.retained
    );
}

/// Run a full evaluation from files.
pub fn run_evaluation(
    request: &EvaluationRequest,
    resolved: &ResolvedConfig,
    ctx: &LogContext,
) -> Result<EvaluationReport> {
    let config = &resolved.config;
    let reference_hash = hash_file(&request.reference)?;
    let predictions_hash = hash_file(&request.predictions)?;

    let inputs = load_inputs(&request.reference, Some(&request.predictions), config, ctx)?;
    let reference = inputs.reference;
    let predictions = inputs.predictions.unwrap_or(Loaded {
        events: Vec::new(),
        stats: LoadStats::default(),
    });

    let evaluation = evaluate(&reference.events, &predictions.events, config);
    log_event!(
        ctx,
        INFO,
        event_names::MATCH_FINISHED,
        Stage::Match,
        "events matched",
        pairs = evaluation.pairs.len()
    );
    log_event!(
        ctx,
        INFO,
        event_names::CLASSIFY_FINISHED,
        Stage::Classify,
        "accuracy aggregated",
        rows = evaluation.accuracy.len()
    );
    log_event!(
        ctx,
        INFO,
        event_names::REGRESS_FINISHED,
        Stage::Regress,
        "regression metrics computed",
        rows = evaluation.regression.len()
    );
    log_event!(
        ctx,
        INFO,
        event_names::COUNT_FINISHED,
        Stage::Count,
        "count deviation computed",
        rows = evaluation.count_deviation.len()
    );

    let mut warnings = load_warnings("reference", &reference.stats);
    warnings.extend(load_warnings("predictions", &predictions.stats));
    warnings.extend(evaluation.undefined_metric_warnings());
    for warning in &warnings {
        let text = warning.to_string();
        match warning {
            Warning::UndefinedMetric { .. } => {
                log_event!(ctx, WARN, event_names::METRIC_UNDEFINED, Stage::Output, text.as_str())
            }
            _ => log_event!(ctx, WARN, event_names::RUN_WARNING, Stage::Output, text.as_str()),
        }
    }

    let Evaluation {
        pairs,
        accuracy,
        regression,
        count_deviation,
    } = evaluation;

    Ok(EvaluationReport {
        metadata: ReportMetadata {
            run_id: ctx.run_id.clone(),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            config: resolved.snapshot(),
            reference: InputFile {
                path: request.reference.clone(),
                sha256: reference_hash,
            },
            predictions: InputFile {
                path: request.predictions.clone(),
                sha256: predictions_hash,
            },
        },
        warnings,
        load: LoadSummary {
            reference: reference.stats,
            predictions: predictions.stats,
        },
        accuracy,
        regression,
        count_deviation,
        matches: request.include_matches.then_some(pairs),
    })
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

    fn pred(unit: &str, doy: u16) -> PredictedEvent {
        PredictedEvent {
            group_id: "A".to_string(),
            method: "m".to_string(),
            data_source: "s".to_string(),
            region: "north".to_string(),
            unit_id: unit.to_string(),
            year: 2021,
            doy,
        }
    }

    #[test]
    fn test_evaluate_produces_all_tables() {
        let refs = [reference("1", 100), reference("2", 200)];
        let preds = [pred("1", 105), pred("2", 190), pred("2", 260)];
        let eval = evaluate(&refs, &preds, &EvalConfig::default());
        assert_eq!(eval.pairs.len(), 2);
        // concrete + 3 roll-ups for one region/year
        assert_eq!(eval.accuracy.len(), 4);
        assert_eq!(eval.regression.len(), 4);
        assert_eq!(eval.count_deviation.len(), 4);
    }

    #[test]
    fn test_single_pair_correlation_warning() {
        let refs = [reference("1", 100)];
        let preds = [pred("1", 105)];
        let eval = evaluate(&refs, &preds, &EvalConfig::default());
        let warnings = eval.undefined_metric_warnings();
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            Warning::UndefinedMetric {
                table,
                metric,
                count,
                cells,
            } => {
                assert_eq!(table, "regression");
                assert_eq!(metric, "correlation");
                assert_eq!(*count, 4);
                assert_eq!(cells[0], "A/m/s north 2021");
            }
            other => panic!("unexpected warning: {other:?}"),
        }
    }

    #[test]
    fn test_load_warnings() {
        let stats = LoadStats {
            rows_read: 3,
            malformed: 1,
            missing_fields: 2,
            ..LoadStats::default()
        };
        let warnings = load_warnings("predictions", &stats);
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].to_string(), "predictions: dropped 1 malformed row(s)");
        assert!(matches!(warnings[2], Warning::EmptyTable { .. }));
    }

    #[test]
    fn test_warning_display_truncates() {
        let warning = Warning::UndefinedMetric {
            table: "accuracy".to_string(),
            metric: "Recall".to_string(),
            count: 12,
            cells: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            warning.to_string(),
            "accuracy: Recall undefined in 12 row(s) (a; b; ...)"
        );
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = Warning::EmptyTable {
            table: "reference".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "empty_table");
        assert_eq!(json["table"], "reference");
    }
}
