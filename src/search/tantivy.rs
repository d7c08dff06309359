use std::path::Path;

use anyhow::{Result, anyhow};
use tantivy::schema::*;
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument};

use crate::model::types::{CanonicalField, FieldRecord};

const SCHEMA_VERSION: &str = "v1";

// Bump this when the schema changes. Used to trigger rebuilds.
pub const SCHEMA_HASH: &str = "field-catalog-schema-v1-ordinal";

#[derive(Clone, Copy)]
pub struct Fields {
    pub canonical: [Field; 10],
    pub source_file: Field,
    pub source_file_lc: Field,
    pub row_number: Field,
    pub ordinal: Field,
}

impl Fields {
    pub fn canonical_field(&self, field: CanonicalField) -> Field {
        let idx = CanonicalField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or(0);
        self.canonical[idx]
    }
}

pub struct FieldIndex {
    pub index: Index,
    writer: IndexWriter,
    pub fields: Fields,
}

impl FieldIndex {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let schema = build_schema();
        std::fs::create_dir_all(path)?;

        let meta_path = path.join("schema_hash.json");
        let mut needs_rebuild = true;
        if meta_path.exists() {
            let meta = std::fs::read_to_string(&meta_path)?;
            if meta.contains(SCHEMA_HASH) {
                needs_rebuild = false;
            }
        }

        if needs_rebuild {
            // Recreate the index directory completely to avoid stale locks.
            let _ = std::fs::remove_dir_all(path);
            std::fs::create_dir_all(path)?;
        }

        let index = if path.join("meta.json").exists() && !needs_rebuild {
            Index::open_in_dir(path)?
        } else {
            Index::create_in_dir(path, schema.clone())?
        };

        std::fs::write(
            &meta_path,
            format!("{{\"schema_hash\":\"{}\"}}", SCHEMA_HASH),
        )?;

        let writer = index
            .writer(30_000_000)
            .map_err(|e| anyhow!("create index writer: {e:?}"))?;
        let fields = fields_from_schema(&schema)?;
        Ok(Self {
            index,
            writer,
            fields,
        })
    }

    /// Index records paired with their catalog ordinals (the sqlite row ids),
    /// so both backends order results identically.
    pub fn add_records(&mut self, records: &[(i64, FieldRecord)]) -> Result<()> {
        for (ordinal, record) in records {
            let mut d = TantivyDocument::default();
            for field in CanonicalField::ALL {
                if let Some(value) = record.get(field) {
                    d.add_text(self.fields.canonical_field(field), value);
                }
            }
            d.add_text(self.fields.source_file, &record.source_file);
            d.add_text(
                self.fields.source_file_lc,
                record.source_file.to_lowercase(),
            );
            d.add_u64(self.fields.row_number, record.row_number as u64);
            d.add_u64(self.fields.ordinal, *ordinal as u64);
            self.writer.add_document(d)?;
        }
        Ok(())
    }

    /// Remove all documents from one source file (before re-ingesting it).
    pub fn delete_file(&mut self, source_file: &str) -> Result<()> {
        let term = Term::from_field_text(
            self.fields.source_file_lc,
            &source_file.to_lowercase(),
        );
        self.writer.delete_term(term);
        Ok(())
    }

    pub fn delete_all(&mut self) -> Result<()> {
        self.writer.delete_all_documents()?;
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.writer.commit()?;
        Ok(())
    }

    pub fn reader(&self) -> Result<IndexReader> {
        Ok(self.index.reader()?)
    }
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    for field in CanonicalField::ALL {
        schema_builder.add_text_field(field.as_snake(), TEXT | STORED);
    }
    schema_builder.add_text_field("source_file", STORED);
    schema_builder.add_text_field("source_file_lc", STRING);
    schema_builder.add_u64_field("row_number", STORED);
    schema_builder.add_u64_field("ordinal", INDEXED | STORED | FAST);
    schema_builder.build()
}

pub fn fields_from_schema(schema: &Schema) -> Result<Fields> {
    let get = |name: &str| {
        schema
            .get_field(name)
            .map_err(|_| anyhow!("schema missing {}", name))
    };
    let mut canonical = [Field::from_field_id(0); 10];
    for (i, field) in CanonicalField::ALL.into_iter().enumerate() {
        canonical[i] = get(field.as_snake())?;
    }
    Ok(Fields {
        canonical,
        source_file: get("source_file")?,
        source_file_lc: get("source_file_lc")?,
        row_number: get("row_number")?,
        ordinal: get("ordinal")?,
    })
}

/// Materialize a canonical record from a stored document. A document with
/// unreadable metadata yields `None` and is dropped from results rather
/// than failing the whole search.
pub fn record_from_doc(doc: &TantivyDocument, fields: &Fields) -> Option<(u64, FieldRecord)> {
    let source_file = doc
        .get_first(fields.source_file)
        .and_then(|v| v.as_str())?
        .to_string();
    let row_number = doc.get_first(fields.row_number).and_then(|v| v.as_u64())?;
    let ordinal = doc.get_first(fields.ordinal).and_then(|v| v.as_u64())?;

    let mut record = FieldRecord {
        source_file,
        row_number: row_number as u32,
        ..Default::default()
    };
    for field in CanonicalField::ALL {
        let value = doc
            .get_first(fields.canonical_field(field))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        record.set(field, value);
    }
    Some((ordinal, record))
}

pub fn index_dir(base: &Path) -> Result<std::path::PathBuf> {
    let dir = base.join("index").join(SCHEMA_VERSION);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
