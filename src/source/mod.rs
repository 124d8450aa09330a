//! Record sources.
//!
//! [`RecordSource`] is the trait the report commands load records through.
//! [`DocumentExport`] reads a JSON document export with timestamp pairs.
//! [`SheetExport`] reads a CSV sheet with free-text durations.

mod documents;
mod sheet;

pub use documents::{DocumentExport, stringify_extended_json};
pub use sheet::SheetExport;

use crate::model::ScreeningRecord;
use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Loads the full record set for one run.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<ScreeningRecord>>;
}

/// Picks a source from the file extension of `path`, looking through a
/// trailing `.gz`.
///
/// `require_complete` applies to document exports only.
pub fn open_source(path: &Path, require_complete: bool) -> Result<Box<dyn RecordSource>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "json" | "jsonl" | "ndjson" => Ok(Box::new(DocumentExport::new(path, require_complete))),
        "csv" => Ok(Box::new(SheetExport::new(path))),
        other => bail!(
            "unsupported input '{}' (extension '{}'), expected .json, .jsonl, .ndjson or .csv",
            path.display(),
            other
        ),
    }
}

/// Opens `path` for reading, gunzipping when it ends in `.gz`.
pub(crate) fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("failed to open input {}", path.display()))?;

    let gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
