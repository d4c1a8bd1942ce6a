//! Markdown rendering of an evaluation report.

use std::fmt::Write;

use super::{NumberFormat, TableRow};
use crate::ingest::LoadStats;
use crate::pipeline::EvaluationReport;

/// Decimals printed for metrics in Markdown tables.
const MARKDOWN_DECIMALS: usize = 3;

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Render rows as a GitHub-flavored Markdown table.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let format = NumberFormat::Fixed(MARKDOWN_DECIMALS);
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", R::COLUMNS.join(" | "));
    let _ = writeln!(
        out,
        "|{}|",
        R::COLUMNS.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    );
    for row in rows {
        let cells: Vec<String> = row.cells(format).iter().map(|c| escape(c)).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

fn render_load(out: &mut String, reference: &LoadStats, predictions: &LoadStats) {
    let rows: [(&str, fn(&LoadStats) -> usize); 9] = [
        ("rows read", |s| s.rows_read),
        ("malformed", |s| s.malformed),
        ("missing fields", |s| s.missing_fields),
        ("duplicates", |s| s.duplicates),
        ("out of range", |s| s.out_of_range),
        ("spacing groups removed", |s| s.spacing_groups_removed),
        ("spacing rows removed", |s| s.spacing_rows_removed),
        ("outside reference cells", |s| s.outside_reference_cells),
        ("retained", |s| s.retained),
    ];
    let _ = writeln!(out, "| | reference | predictions |");
    let _ = writeln!(out, "|---|---|---|");
    for (label, get) in rows {
        let _ = writeln!(out, "| {} | {} | {} |", label, get(reference), get(predictions));
    }
}

/// Render the full report: provenance, load accounting, warnings and tables.
pub fn render_report(report: &EvaluationReport) -> String {
    let meta = &report.metadata;
    let config = &meta.config.config;
    let mut out = String::new();

    let _ = writeln!(out, "# Mowing event accuracy\n");
    let _ = writeln!(out, "- run: `{}` ({})", meta.run_id, meta.generated_at.to_rfc3339());
    let _ = writeln!(out, "- reference: `{}`", meta.reference.path.display());
    let _ = writeln!(out, "- predictions: `{}`", meta.predictions.path.display());
    let _ = writeln!(
        out,
        "- tolerance: {} days, valid range: {}, minimum spacing: {} days, metric scope: {}",
        config.tolerance, config.valid_range, config.event_min_difference, config.metric_scope
    );

    let _ = writeln!(out, "\n## Load\n");
    render_load(&mut out, &report.load.reference, &report.load.predictions);

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\n## Warnings\n");
        for warning in &report.warnings {
            let _ = writeln!(out, "- {}", warning);
        }
    }

    let _ = writeln!(out, "\n## Accuracy\n");
    out.push_str(&render_table(&report.accuracy));
    let _ = writeln!(out, "\n## Date regression\n");
    out.push_str(&render_table(&report.regression));
    let _ = writeln!(out, "\n## Count deviation\n");
    out.push_str(&render_table(&report.count_deviation));

    if let Some(matches) = &report.matches {
        let _ = writeln!(out, "\n## Matched pairs\n");
        out.push_str(&render_table(matches));
    }
    out
}
