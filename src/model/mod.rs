//! Typed data model shared by the schema, storage, and search layers.

pub mod types;
