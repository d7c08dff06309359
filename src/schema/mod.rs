//! Schema normalization: mapping heterogeneous raw spreadsheet headers onto
//! the canonical field vocabulary and turning raw rows into clean records.
//!
//! - **[`aliases`]**: the static header alias table.
//! - **[`resolver`]**: per-file resolution of raw headers to canonical fields.
//! - **[`value`]**: raw cell values and their normalization to clean strings.
//! - **[`record`]**: composition of the above into [`crate::model::types::FieldRecord`]s.

pub mod aliases;
pub mod record;
pub mod resolver;
pub mod value;
