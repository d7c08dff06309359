use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::model::types::{CanonicalField, FieldRecord};

const SCHEMA_VERSION: i64 = 1;

/// The sqlite catalog of canonical records. Insertion order is preserved by
/// the autoincrement id, which doubles as the stable ordinal the index
/// backend sorts by. Values are stored NULL when absent so "absent" and
/// "empty string" stay distinguishable at rest.
pub struct CatalogStorage {
    conn: Connection,
}

impl CatalogStorage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open catalog db {}", path.display()))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
        };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS field_records (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    field_name TEXT,
                    description TEXT,
                    field_type TEXT,
                    format TEXT,
                    field_length TEXT,
                    default_value TEXT,
                    valid_values TEXT,
                    field_behaviour TEXT,
                    visibility_rules TEXT,
                    visibility_attributes TEXT,
                    source_file TEXT NOT NULL,
                    row_number INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_field_records_source_file
                    ON field_records(source_file);
                "#,
            )?;
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    pub fn raw(&self) -> &Connection {
        &self.conn
    }

    /// Drop every record; the table and version survive.
    pub fn reset(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM field_records", [])?;
        Ok(())
    }

    /// Drop all records from one source file (used before re-ingesting it).
    pub fn delete_file(&mut self, source_file: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM field_records WHERE source_file = ?1",
            params![source_file],
        )?;
        Ok(())
    }

    /// Insert records in order, returning their assigned ids (the global
    /// ordinals the index backend mirrors).
    pub fn insert_records(&mut self, records: &[FieldRecord]) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO field_records (
                    field_name, description, field_type, format, field_length,
                    default_value, valid_values, field_behaviour,
                    visibility_rules, visibility_attributes,
                    source_file, row_number
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)
                "#,
            )?;
            for record in records {
                stmt.execute(params![
                    record.field_name,
                    record.description,
                    record.field_type,
                    record.format,
                    record.field_length,
                    record.default_value,
                    record.valid_values,
                    record.field_behaviour,
                    record.visibility_rules,
                    record.visibility_attributes,
                    record.source_file,
                    record.row_number,
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Every record in insertion order: the in-process scan backend's feed.
    pub fn all_records(&self) -> Result<Vec<FieldRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT field_name, description, field_type, format, field_length,
                   default_value, valid_values, field_behaviour,
                   visibility_rules, visibility_attributes,
                   source_file, row_number
            FROM field_records ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let mut record = FieldRecord {
                source_file: row.get(10)?,
                row_number: row.get(11)?,
                ..Default::default()
            };
            for (i, field) in CanonicalField::ALL.into_iter().enumerate() {
                record.set(field, row.get::<_, Option<String>>(i)?);
            }
            Ok(record)
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn record_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM field_records", [], |row| row.get(0))?)
    }

    /// Distinct source files, name-sorted.
    pub fn distinct_files(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT source_file FROM field_records ORDER BY source_file",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }

    /// Distinct fieldType values with counts, most frequent first.
    pub fn distinct_field_types(&self) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT field_type, COUNT(*) AS n FROM field_records
            WHERE field_type IS NOT NULL
            GROUP BY field_type ORDER BY n DESC, field_type
            "#,
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut types = Vec::new();
        for row in rows {
            types.push(row?);
        }
        Ok(types)
    }

    /// One arbitrary record, if any. Debug introspection only.
    pub fn sample_record(&self) -> Result<Option<FieldRecord>> {
        let mut records = self.all_records()?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, field_type: Option<&str>, file: &str, row: u32) -> FieldRecord {
        FieldRecord {
            field_name: Some(name.to_string()),
            field_type: field_type.map(|s| s.to_string()),
            source_file: file.to_string(),
            row_number: row,
            ..Default::default()
        }
    }

    #[test]
    fn round_trips_records_in_insertion_order() {
        let mut storage = CatalogStorage::open_in_memory().unwrap();
        let records = vec![
            record("B", Some("Text"), "b.xlsx", 2),
            record("A", None, "a.xlsx", 2),
            record("C", Some("Integer"), "a.xlsx", 3),
        ];
        let ids = storage.insert_records(&records).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        let loaded = storage.all_records().unwrap();
        assert_eq!(loaded, records);
        // Absent stays absent through the round trip.
        assert_eq!(loaded[1].field_type, None);
    }

    #[test]
    fn delete_file_leaves_other_files_intact() {
        let mut storage = CatalogStorage::open_in_memory().unwrap();
        storage
            .insert_records(&[
                record("A", None, "a.xlsx", 2),
                record("B", None, "b.xlsx", 2),
            ])
            .unwrap();
        storage.delete_file("a.xlsx").unwrap();
        let loaded = storage.all_records().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].source_file, "b.xlsx");
    }

    #[test]
    fn reset_clears_records_but_keeps_version() {
        let mut storage = CatalogStorage::open_in_memory().unwrap();
        storage
            .insert_records(&[record("A", None, "a.xlsx", 2)])
            .unwrap();
        storage.reset().unwrap();
        assert_eq!(storage.record_count().unwrap(), 0);
        assert_eq!(storage.schema_version().unwrap(), 1);
    }

    #[test]
    fn introspection_queries() {
        let mut storage = CatalogStorage::open_in_memory().unwrap();
        storage
            .insert_records(&[
                record("A", Some("Integer"), "a.xlsx", 2),
                record("B", Some("Integer"), "a.xlsx", 3),
                record("C", Some("Text"), "b.xlsx", 2),
                record("D", None, "b.xlsx", 3),
            ])
            .unwrap();

        assert_eq!(storage.distinct_files().unwrap(), vec!["a.xlsx", "b.xlsx"]);
        assert_eq!(
            storage.distinct_field_types().unwrap(),
            vec![("Integer".to_string(), 2), ("Text".to_string(), 1)]
        );
        let sample = storage.sample_record().unwrap().unwrap();
        assert_eq!(sample.field_name.as_deref(), Some("A"));
    }
}
