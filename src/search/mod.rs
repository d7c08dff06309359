//! Search layer.
//!
//! - **[`matcher`]**: the matching algebra every backend must reproduce.
//! - **[`tantivy`]**: index creation, schema management, and document handling.
//! - **[`query`]**: the search client over the index, with sqlite fallback.

pub mod matcher;
pub mod query;
pub mod tantivy;
