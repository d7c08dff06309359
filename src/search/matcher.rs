//! The matching algebra: the single definition of what it means for a
//! canonical record to satisfy a query. Both backends (the tantivy index
//! and the sqlite full scan) materialize records and delegate here, so
//! their results are identical by construction.

use crate::model::types::{FieldRecord, SearchQuery};

/// Hard cap on result-set size.
pub const MAX_RESULTS: usize = 1000;

/// Extension assumed when a file filter is written without one.
pub const DEFAULT_EXTENSION: &str = ".xlsx";

const KNOWN_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Canonical form of a file filter term: trimmed, with [`DEFAULT_EXTENSION`]
/// appended when no recognized spreadsheet extension is present. Queries are
/// routinely authored as bare stems ("a" for "a.xlsx").
pub fn canonical_file_filter(term: &str) -> String {
    let trimmed = term.trim();
    let lower = trimmed.to_lowercase();
    if KNOWN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{DEFAULT_EXTENSION}")
    }
}

/// Evaluate `record` against `query`.
///
/// - The file filter, when set, must equal the record's source file
///   (case-insensitive, after [`canonical_file_filter`]).
/// - Every field term must be contained, case-insensitively, in the
///   record's value for that field; absent values satisfy nothing.
/// - Constraints AND together; a query with no constraints matches all.
///
/// Total: no input can make this fail.
pub fn matches(record: &FieldRecord, query: &SearchQuery) -> bool {
    if let Some(filter) = query.file_name() {
        let wanted = canonical_file_filter(filter).to_lowercase();
        if record.source_file.to_lowercase() != wanted {
            return false;
        }
    }

    for (field, term) in query.terms() {
        let needle = term.to_lowercase();
        let satisfied = record
            .get(field)
            .is_some_and(|value| value.to_lowercase().contains(&needle));
        if !satisfied {
            return false;
        }
    }
    true
}

/// Filter `records` through [`matches`], preserving input order, capped at
/// `limit` (itself capped at [`MAX_RESULTS`]).
pub fn search<I>(records: I, query: &SearchQuery, limit: usize) -> Vec<FieldRecord>
where
    I: IntoIterator<Item = FieldRecord>,
{
    records
        .into_iter()
        .filter(|record| matches(record, query))
        .take(limit.min(MAX_RESULTS))
        .collect()
}
