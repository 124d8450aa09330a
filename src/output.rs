//! Report persistence.
//!
//! Every report is a single CSV table with a header row and no index column.
//! Existing files are overwritten.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::bucket_columns;
use crate::model::{AggregationRow, AnswerAggregationRow, GlobalBucketRow};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// Logs report rows as pretty-printed JSON.
pub fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Shortest round-trip form, matching how serialized rows render floats.
fn cell(value: f64) -> String {
    format!("{:?}", value)
}

const GLOBAL_HEADER: [&str; 2] = ["Time Class", "Percentage"];
const ANSWER_HEADER: [&str; 5] = ["Job ID", "Question", "% Correct", "% Wrong", "% NA"];

/// Headers are written explicitly so that an empty report still has one.
fn create_writer(path: &Path) -> Result<Writer<File>> {
    debug!(path = %path.display(), "Writing CSV report");
    WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))
}

/// Writes the per-job breakdown.
///
/// Columns: `Job ID`, `<5mins`, one column per bucket seen in any row (in
/// bucket order, 0 where a job has none), then `Unclassified`.
pub fn write_time_report(path: &Path, rows: &[AggregationRow]) -> Result<()> {
    let columns = bucket_columns(rows);
    let mut writer = create_writer(path)?;

    let mut header = vec!["Job ID".to_string(), "<5mins".to_string()];
    header.extend(columns.iter().map(|b| b.label().to_string()));
    header.push("Unclassified".to_string());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.group_key.clone(), cell(row.under_5_min_percent)];
        record.extend(
            columns
                .iter()
                .map(|bucket| cell(row.bucket_percentages.get(bucket).copied().unwrap_or(0.0))),
        );
        record.push(row.unclassified.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Time report written");
    Ok(())
}

/// Writes `header`, then one serialized record per row.
fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}

/// Writes the overall breakdown (`Time Class`, `Percentage`).
pub fn write_global_report(path: &Path, rows: &[GlobalBucketRow]) -> Result<()> {
    write_rows(path, &GLOBAL_HEADER, rows)
}

/// Writes answer rates (`Job ID`, `Question`, `% Correct`, `% Wrong`, `% NA`).
pub fn write_answer_report(path: &Path, rows: &[AnswerAggregationRow]) -> Result<()> {
    write_rows(path, &ANSWER_HEADER, rows)
}
