use anyhow::Result;
use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, warn};

use crate::schema::value::RawValue;
use crate::sources::{
    DetectionResult, RawRow, RawTable, RowSource, ScanContext, files_with_extensions,
};

const EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Reads `.xlsx`/`.xls` workbooks from the source directory. Data is taken
/// from the first worksheet; row 1 supplies the headers.
pub struct ExcelSource;

impl Default for ExcelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcelSource {
    pub fn new() -> Self {
        Self
    }
}

impl RowSource for ExcelSource {
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
            match read_workbook(&path) {
                Ok(Some(table)) => {
                    debug!(file = %file_name, rows = table.rows.len(), "excel_scan");
                    tables.push(table);
                }
                Ok(None) => {
                    warn!(file = %file_name, "excel workbook has no data rows");
                }
                Err(err) => {
                    // One unreadable workbook must not sink the whole scan.
                    warn!(file = %file_name, error = %err, "skipping unreadable workbook");
                }
            }
        }
        Ok(tables)
    }
}

fn read_workbook(path: &std::path::Path) -> Result<Option<RawTable>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(None),
    };
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_header).collect(),
        None => return Ok(None),
    };

    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data_rows: Vec<RawRow> = rows
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), cell_to_raw(cell)))
                .collect()
        })
        .collect();

    Ok(Some(RawTable {
        file_name,
        headers,
        rows: data_rows,
    }))
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Null,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Int(*i),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) => RawValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_directory_is_not_detected() {
        let tmp = TempDir::new().unwrap();
        let ctx = ScanContext {
            source_dir: tmp.path().to_path_buf(),
        };
        assert!(!ExcelSource::new().detect(&ctx).detected);
    }

    #[test]
    fn corrupt_workbook_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.xlsx"), b"not a zip archive").unwrap();
        let ctx = ScanContext {
            source_dir: tmp.path().to_path_buf(),
        };
        let source = ExcelSource::new();
        assert!(source.detect(&ctx).detected);
        let tables = source.scan(&ctx).unwrap();
        assert!(tables.is_empty());
    }
}
