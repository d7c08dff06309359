use anyhow::Result;
use tracing::{debug, warn};

use crate::schema::value::RawValue;
use crate::sources::{
    DetectionResult, RawRow, RawTable, RowSource, ScanContext, files_with_extensions,
};

const EXTENSIONS: [&str; 1] = ["csv"];

/// Reads `.csv` exports from the source directory. Every cell arrives as
/// text; empty cells become null so they normalize to absent, matching how
/// empty spreadsheet cells behave.
pub struct CsvSource;

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSource {
    pub fn new() -> Self {
        Self
    }
}

impl RowSource for CsvSource {
    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        let files = files_with_extensions(ctx, &EXTENSIONS);
        if files.is_empty() {
            DetectionResult::not_found()
        } else {
            DetectionResult {
                detected: true,
                evidence: files
                    .iter()
                    .map(|p| format!("found {}", p.display()))
                    .collect(),
            }
        }
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<RawTable>> {
        let mut tables = Vec::new();
        for path in files_with_extensions(ctx, &EXTENSIONS) {
            let file_name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match read_csv(&path) {
                Ok(Some(table)) => {
                    debug!(file = %file_name, rows = table.rows.len(), "csv_scan");
                    tables.push(table);
                }
                Ok(None) => {
                    warn!(file = %file_name, "csv file has no header row");
                }
                Err(err) => {
                    warn!(file = %file_name, error = %err, "skipping unreadable csv");
                }
            }
        }
        Ok(tables)
    }
}

fn read_csv(path: &std::path::Path) -> Result<Option<RawTable>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Ok(None);
    }

    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut rows: Vec<RawRow> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    RawValue::Null
                } else {
                    RawValue::Text(cell.to_string())
                };
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Some(RawTable {
        file_name,
        headers,
        rows,
    }))
}
