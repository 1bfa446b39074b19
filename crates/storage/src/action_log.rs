//! Append-only CSV log of recorded user requests.
//!
//! One row per request, three columns: `timestamp`, `demande` (the raw
//! request) and `résumé` (the extracted summary, one line, fields joined with
//! ` | `). The header is written once, when the file is created. Rows are
//! never rewritten.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

pub const HEADER: [&str; 3] = ["timestamp", "demande", "résumé"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogRow {
    pub timestamp: String,
    #[serde(rename = "demande")]
    pub request: String,
    #[serde(rename = "résumé")]
    pub summary: String,
}

/// Appends one row, writing the header first if the log is new or empty.
///
/// The file is synced before returning so a successful return means the row
/// is on disk.
pub fn append_row(path: &Path, row: &ActionLogRow) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let needs_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    if needs_header {
        writer.write_record(HEADER)?;
    }
    writer.write_record([
        row.timestamp.as_str(),
        row.request.as_str(),
        row.summary.as_str(),
    ])?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_data()?;

    debug!(path = %path.display(), header = needs_header, "appended action row");
    Ok(())
}

/// Reads every row back, skipping the header. A missing file has no rows.
pub fn read_rows(path: &Path) -> Result<Vec<ActionLogRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
