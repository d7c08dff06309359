use std::path::Path;

use anyhow::Result;
use tantivy::TantivyDocument;
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Term};
use tracing::debug;

use crate::model::types::{FieldRecord, SearchQuery};
use crate::search::matcher::{self, MAX_RESULTS, canonical_file_filter};
use crate::search::tantivy::{Fields, fields_from_schema, record_from_doc};
use crate::storage::sqlite::CatalogStorage;

/// Read side of the catalog. Prefers the tantivy index; falls back to a
/// full scan of the sqlite catalog when no index is present. Both paths
/// materialize records and delegate to [`matcher::matches`], so a query
/// answers identically regardless of backend.
pub struct SearchClient {
    reader: Option<(tantivy::IndexReader, Fields)>,
    catalog: Option<CatalogStorage>,
}

impl SearchClient {
    /// Returns `None` when neither the index nor the catalog exists.
    pub fn open(index_path: &Path, db_path: Option<&Path>) -> Result<Option<Self>> {
        let reader = tantivy::Index::open_in_dir(index_path).ok().and_then(|idx| {
            let schema = idx.schema();
            let fields = fields_from_schema(&schema).ok()?;
            idx.reader().ok().map(|reader| (reader, fields))
        });

        let catalog = db_path
            .filter(|p| p.exists())
            .and_then(|p| CatalogStorage::open(p).ok());

        if reader.is_none() && catalog.is_none() {
            return Ok(None);
        }

        Ok(Some(Self { reader, catalog }))
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<FieldRecord>> {
        self.search_limited(query, MAX_RESULTS)
    }

    pub fn search_limited(&self, query: &SearchQuery, limit: usize) -> Result<Vec<FieldRecord>> {
        if let Some((reader, fields)) = &self.reader {
            return search_index(reader, fields, query, limit);
        }
        if let Some(catalog) = &self.catalog {
            debug!("index absent, scanning catalog");
            return Ok(matcher::search(catalog.all_records()?, query, limit));
        }
        Ok(Vec::new())
    }
}

/// Narrow candidates natively where cheap (the file filter maps to a term
/// query on the lowercased file name), then materialize in catalog order
/// and let the shared matcher apply the full algebra.
fn search_index(
    reader: &tantivy::IndexReader,
    fields: &Fields,
    query: &SearchQuery,
    limit: usize,
) -> Result<Vec<FieldRecord>> {
    let searcher = reader.searcher();

    let native: Box<dyn Query> = match query.file_name() {
        Some(filter) => Box::new(TermQuery::new(
            Term::from_field_text(
                fields.source_file_lc,
                &canonical_file_filter(filter).to_lowercase(),
            ),
            IndexRecordOption::Basic,
        )),
        None => Box::new(AllQuery),
    };

    let candidate_cap = searcher.num_docs().max(1) as usize;
    let top_docs = searcher.search(&native, &TopDocs::with_limit(candidate_cap))?;

    let mut candidates: Vec<(u64, FieldRecord)> = Vec::with_capacity(top_docs.len());
    for (_score, addr) in top_docs {
        let doc: TantivyDocument = searcher.doc(addr)?;
        // Malformed documents are excluded, never fatal.
        if let Some(entry) = record_from_doc(&doc, fields) {
            candidates.push(entry);
        }
    }
    candidates.sort_by_key(|(ordinal, _)| *ordinal);

    Ok(matcher::search(
        candidates.into_iter().map(|(_, record)| record),
        query,
        limit,
    ))
}
