use crate::model::ScreeningRecord;
use crate::source::{RecordSource, open_reader};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

/// A CSV sheet export with one row per candidate answer.
///
/// Expected header columns: `Job Title`, `Screening Completed In`,
/// `Question` and `Correct Answer`. None is required; a missing column or an
/// empty cell reads as absent.
#[derive(Debug)]
pub struct SheetExport {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Job Title", default)]
    job_title: Option<String>,
    #[serde(rename = "Screening Completed In", default)]
    completed_in: Option<String>,
    #[serde(rename = "Question", default)]
    question: Option<String>,
    #[serde(rename = "Correct Answer", default)]
    answer: Option<String>,
}

impl SheetExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for SheetExport {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<ScreeningRecord>> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(open_reader(&self.path)?);

        let mut records = Vec::new();
        for (index, row) in reader.deserialize().enumerate() {
            let row: SheetRow = row.with_context(|| {
                format!("bad row {} in {}", index + 2, self.path.display())
            })?;
            records.push(ScreeningRecord {
                job_id: row.job_title,
                raw_duration_text: row.completed_in,
                qualifying_question_label: row.question,
                candidate_status_label: row.answer,
                ..Default::default()
            });
        }

        info!(rows = records.len(), "Sheet loaded");
        Ok(records)
    }
}
