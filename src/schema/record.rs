use crate::model::types::{CanonicalField, FieldRecord};
use crate::schema::resolver::ResolvedSchema;
use crate::schema::value::normalize;
use crate::sources::RawRow;

/// First data row of a spreadsheet whose row 1 holds the headers.
pub const FIRST_DATA_ROW: u32 = 2;

/// Build one canonical record from a raw row.
///
/// Fields the schema did not resolve, and cells the normalizer rejects,
/// come out absent; nothing in here can fail.
pub fn build(
    row: &RawRow,
    schema: &ResolvedSchema,
    source_file: &str,
    row_number: u32,
) -> FieldRecord {
    let mut record = FieldRecord {
        source_file: source_file.to_string(),
        row_number,
        ..Default::default()
    };
    for field in CanonicalField::ALL {
        let value = schema
            .raw_header(field)
            .and_then(|header| row.get(header))
            .and_then(normalize);
        record.set(field, value);
    }
    record
}

/// Build canonical records for a whole table in row order, numbering rows
/// from [`FIRST_DATA_ROW`].
pub fn build_table(
    rows: &[RawRow],
    schema: &ResolvedSchema,
    source_file: &str,
) -> Vec<FieldRecord> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| build(row, schema, source_file, FIRST_DATA_ROW + idx as u32))
        .collect()
}
