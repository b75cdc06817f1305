//! Corpus supplier: reads job postings from the CSV written by the data
//! acquisition job.
//!
//! Columns are matched by header name, extra columns are ignored and missing
//! ones become empty strings. `location` and `category` may still carry the
//! raw API object (`{'display_name': ...}` / `{'label': ...}`); those cells are
//! flattened to the display string.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::types::JobRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    id: String,
    title: String,
    company: String,
    location: String,
    description: String,
    category: String,
    salary_min: String,
    salary_max: String,
    contract_type: String,
    contract_time: String,
    redirect_url: String,
}

impl From<CsvRow> for JobRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            company: row.company,
            location: flatten_nested(&row.location, "display_name"),
            category: flatten_nested(&row.category, "label"),
            description: row.description,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            contract_type: row.contract_type,
            contract_time: row.contract_time,
            redirect_url: row.redirect_url,
        }
    }
}

pub fn load_job_records(path: &Path) -> Result<Vec<JobRecord>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Error::NotFound(path.display().to_string()) } else { Error::Io(e) }
    })?;
    let records = read_job_records(file).map_err(|source| Error::Corpus { path: path.to_path_buf(), source })?;
    info!(count = records.len(), path = %path.display(), "loaded job listings");
    Ok(records)
}

/// Like [`load_job_records`], but a missing or unreadable corpus degrades to
/// an empty one so the chat front end can still start.
pub fn load_job_records_or_empty(path: &Path) -> Vec<JobRecord> {
    match load_job_records(path) {
        Ok(records) => records,
        Err(e) => {
            error!(path = %path.display(), error = %e, "corpus unavailable, continuing with no job listings");
            Vec::new()
        }
    }
}

pub fn read_job_records<R: Read>(reader: R) -> std::result::Result<Vec<JobRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(reader);
    let mut out = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => out.push(JobRecord::from(row)),
            // Bad rows are skipped; I/O and UTF-8 errors are not.
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                warn!(row = line + 1, error = %e, "skipping malformed corpus row");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Pull `key` out of a serialised object cell, or pass plain strings through.
fn flatten_nested(cell: &str, key: &str) -> String {
    let trimmed = cell.trim();
    if !trimmed.starts_with('{') {
        return cell.to_string();
    }
    let parsed = serde_json::from_str::<serde_json::Value>(trimmed)
        .or_else(|_| serde_json::from_str::<serde_json::Value>(&trimmed.replace('\'', "\"")));
    match parsed {
        Ok(serde_json::Value::Object(map)) => match map.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Unknown".to_string(),
        },
        _ => cell.to_string(),
    }
}
