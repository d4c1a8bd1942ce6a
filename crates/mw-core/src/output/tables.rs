//! CSV files, one per table.

use mw_common::Result;
use std::path::{Path, PathBuf};

use super::{NumberFormat, TableRow};
use crate::ingest::csv_error;
use crate::pipeline::{CleanedInputs, EvaluationReport};

/// Write `rows` with a header line to `path`, replacing any existing file.
pub fn write_table<R: TableRow>(path: &Path, rows: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(R::COLUMNS)
        .map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer
            .write_record(row.cells(NumberFormat::Full))
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the result tables of a report into `dir`.
///
/// Returns the written paths in a stable order.
pub fn write_report_tables(report: &EvaluationReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("accuracy.csv");
    write_table(&path, &report.accuracy)?;
    written.push(path);

    let path = dir.join("regression.csv");
    write_table(&path, &report.regression)?;
    written.push(path);

    let path = dir.join("count_deviation.csv");
    write_table(&path, &report.count_deviation)?;
    written.push(path);

    if let Some(matches) = &report.matches {
        let path = dir.join("matches.csv");
        write_table(&path, matches)?;
        written.push(path);
    }
    Ok(written)
}

/// Write cleaned inputs into `dir` in their input layout.
pub fn write_cleaned(inputs: &CleanedInputs, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("reference_clean.csv");
    write_table(&path, &inputs.reference.events)?;
    written.push(path);

    if let Some(predictions) = &inputs.predictions {
        let path = dir.join("predictions_clean.csv");
        write_table(&path, &predictions.events)?;
        written.push(path);
    }
    Ok(written)
}
