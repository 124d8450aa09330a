use crate::model::ScreeningRecord;
use crate::source::{RecordSource, open_reader};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

/// A JSON export of screening documents: an array, a single document, or
/// one document per line.
///
/// Values in MongoDB extended-JSON form (`{"$oid": ..}`, `{"$date": ..}`)
/// are accepted.
#[derive(Debug)]
pub struct DocumentExport {
    path: PathBuf,
    require_complete: bool,
}

/// Fields read from each document; everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreeningDocument {
    #[serde(default)]
    job_id: Value,
    #[serde(default)]
    screening_triggered_on: Value,
    #[serde(default)]
    screening_completed_at: Value,
    #[serde(default)]
    qualifying_questions: Value,
    #[serde(default)]
    candidate_status: Value,
}

impl DocumentExport {
    pub fn new(path: impl Into<PathBuf>, require_complete: bool) -> Self {
        Self {
            path: path.into(),
            require_complete,
        }
    }

    fn read_documents(&self) -> Result<Vec<Value>> {
        let mut content = String::new();
        open_reader(&self.path)?
            .read_to_string(&mut content)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        parse_documents(&content)
            .with_context(|| format!("invalid document export {}", self.path.display()))
    }
}

impl RecordSource for DocumentExport {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<ScreeningRecord>> {
        let documents = self.read_documents()?;
        let total = documents.len();

        let mut records = Vec::with_capacity(total);
        for (index, document) in documents.iter().enumerate() {
            let document: ScreeningDocument =
                serde_json::from_value(stringify_extended_json(document))
                    .with_context(|| format!("document {} is not an object", index))?;
            records.push(document.into_record());
        }

        if self.require_complete {
            records.retain(is_complete);
        }

        info!(
            total,
            kept = records.len(),
            filtered = total - records.len(),
            "Documents loaded"
        );
        Ok(records)
    }
}

impl ScreeningDocument {
    fn into_record(self) -> ScreeningRecord {
        ScreeningRecord {
            job_id: value_label(&self.job_id),
            screening_triggered_on: parse_timestamp(&self.screening_triggered_on),
            screening_completed_at: parse_timestamp(&self.screening_completed_at),
            raw_duration_text: None,
            qualifying_question_label: value_label(&self.qualifying_questions),
            candidate_status_label: value_label(&self.candidate_status),
        }
    }
}

/// Both timestamps and a job id present.
fn is_complete(record: &ScreeningRecord) -> bool {
    record.job_id.is_some()
        && record.screening_triggered_on.is_some()
        && record.screening_completed_at.is_some()
}

fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    // A lone document may span several lines.
    if trimmed.starts_with('{') {
        if let Ok(document @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return Ok(vec![document]);
        }
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<Value>(line).with_context(|| format!("line {}", n + 1))
        })
        .collect()
}

/// Returns a copy of `value` with extended-JSON wrappers replaced by plain
/// strings: `{"$oid": id}` becomes `id` and `{"$date": ..}` becomes an
/// RFC 3339 timestamp. Nested objects and arrays are rewritten too.
pub fn stringify_extended_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(plain) = unwrap_extended(map) {
                return plain;
            }
            Value::Object(
                map.iter()
                    .map(|(key, v)| (key.clone(), stringify_extended_json(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(stringify_extended_json).collect()),
        other => other.clone(),
    }
}

fn unwrap_extended(map: &Map<String, Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }

    if let Some(Value::String(oid)) = map.get("$oid") {
        return Some(Value::String(oid.clone()));
    }

    let millis = match map.get("$date")? {
        Value::String(s) => return Some(Value::String(s.clone())),
        Value::Number(n) => n.as_i64()?,
        Value::Object(inner) => inner.get("$numberLong")?.as_str()?.parse().ok()?,
        _ => return None,
    };

    DateTime::from_timestamp_millis(millis).map(|ts| Value::String(ts.to_rfc3339()))
}

/// Non-null values as text; strings are taken verbatim, anything else as
/// compact JSON.
fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS[.f]` timestamp read as
/// UTC. Anything else is treated as missing.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    debug!(value = text, "Unreadable timestamp");
    None
}
