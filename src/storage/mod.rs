//! Persistence layer: the sqlite catalog of canonical records.

pub mod sqlite;
