//! Ingestion collaborators: each source knows how to turn one family of
//! spreadsheet exports into raw tables (header list + rows of raw cells).
//! The core never reads files itself; it consumes what a source hands over.
//!
//! Per-file failures are isolated inside `scan`: a file that cannot be read
//! is logged and yields zero rows, and the remaining files still load.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;

use crate::schema::value::RawValue;

pub mod csv;
pub mod excel;

pub use self::csv::CsvSource;
pub use self::excel::ExcelSource;

/// One raw spreadsheet row: raw header string to raw cell value.
pub type RawRow = HashMap<String, RawValue>;

/// One source file's worth of raw data, headers in original column order.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone)]
pub struct ScanContext {
    pub source_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub detected: bool,
    pub evidence: Vec<String>,
}

impl DetectionResult {
    pub fn not_found() -> Self {
        Self {
            detected: false,
            evidence: Vec::new(),
        }
    }
}

pub trait RowSource {
    /// Cheap probe: does this source have anything to offer under `ctx`?
    fn detect(&self, ctx: &ScanContext) -> DetectionResult;

    /// Load every readable file, in deterministic (name-sorted) order.
    fn scan(&self, ctx: &ScanContext) -> Result<Vec<RawTable>>;
}

/// Name-sorted files under `ctx.source_dir` whose extension (lower-cased)
/// is in `extensions`.
pub(crate) fn files_with_extensions(ctx: &ScanContext, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&ctx.source_dir)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
