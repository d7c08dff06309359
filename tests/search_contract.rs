//! Differential tests: the tantivy-backed client and the in-process catalog
//! scan must answer every query identically, because both delegate to the
//! shared matcher after materializing records.

use field_catalog_search::model::types::{CanonicalField, FieldRecord, SearchQuery};
use field_catalog_search::search::matcher;
use field_catalog_search::search::query::SearchClient;
use field_catalog_search::search::tantivy::FieldIndex;
use field_catalog_search::storage::sqlite::CatalogStorage;
use tempfile::TempDir;

fn record(
    name: &str,
    field_type: Option<&str>,
    rules: Option<&str>,
    file: &str,
    row: u32,
) -> FieldRecord {
    FieldRecord {
        field_name: Some(name.to_string()),
        field_type: field_type.map(|s| s.to_string()),
        visibility_rules: rules.map(|s| s.to_string()),
        source_file: file.to_string(),
        row_number: row,
        ..Default::default()
    }
}

fn corpus() -> Vec<FieldRecord> {
    vec![
        record("CustomerID", Some("Integer"), Some("admin"), "a.xlsx", 2),
        record("CustomerName", Some("Text"), None, "a.xlsx", 3),
        record("OrderID", Some("INTEGER"), Some("Admin Only"), "b.xlsx", 2),
        record("OrderDate", Some("date"), Some("everyone"), "b.xlsx", 3),
        record("Notes", None, Some("admin"), "c.csv", 2),
    ]
}

/// Seed both backends with the same records and ordinals; return clients
/// for the indexed path and the scan-only path.
fn seeded(tmp: &TempDir) -> (SearchClient, SearchClient) {
    let records = corpus();

    let db_path = tmp.path().join("catalog.db");
    let mut storage = CatalogStorage::open(&db_path).unwrap();
    let ids = storage.insert_records(&records).unwrap();

    let index_path = tmp.path().join("index");
    let mut index = FieldIndex::open_or_create(&index_path).unwrap();
    let pairs: Vec<(i64, FieldRecord)> = ids.into_iter().zip(records).collect();
    index.add_records(&pairs).unwrap();
    index.commit().unwrap();
    drop(storage);

    let indexed = SearchClient::open(&index_path, None).unwrap().unwrap();
    let scan = SearchClient::open(&tmp.path().join("no-index"), Some(&db_path))
        .unwrap()
        .unwrap();
    (indexed, scan)
}

fn assert_backends_agree(tmp: &TempDir, query: &SearchQuery) -> Vec<FieldRecord> {
    let (indexed, scan) = seeded(tmp);
    let from_index = indexed.search(query).unwrap();
    let from_scan = scan.search(query).unwrap();
    assert_eq!(from_index, from_scan, "backends diverged for {query:?}");
    from_index
}

#[test]
fn empty_query_returns_full_corpus_in_order_on_both_backends() {
    let tmp = TempDir::new().unwrap();
    let results = assert_backends_agree(&tmp, &SearchQuery::default());
    assert_eq!(results, corpus());
}

#[test]
fn field_type_partial_match_agrees() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_term(CanonicalField::FieldType, "int");
    let results = assert_backends_agree(&tmp, &query);
    // "Integer" and "INTEGER" match; "Text", "date", and absent do not.
    let names: Vec<_> = results
        .iter()
        .map(|r| r.field_name.as_deref().unwrap())
        .collect();
    assert_eq!(names, vec!["CustomerID", "OrderID"]);
}

#[test]
fn file_filter_without_extension_agrees() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_file("a");
    let results = assert_backends_agree(&tmp, &query);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.source_file == "a.xlsx"));
}

#[test]
fn combined_criteria_agree() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_file("b.xlsx");
    query.set_term(CanonicalField::FieldType, "int");
    query.set_term(CanonicalField::VisibilityRules, "admin");
    let results = assert_backends_agree(&tmp, &query);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].field_name.as_deref(), Some("OrderID"));
}

#[test]
fn no_match_is_empty_on_both_backends() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_term(CanonicalField::FieldName, "nonexistent");
    let results = assert_backends_agree(&tmp, &query);
    assert!(results.is_empty());
}

#[test]
fn csv_sources_are_filterable_by_full_name() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_file("c.csv");
    let results = assert_backends_agree(&tmp, &query);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].field_name.as_deref(), Some("Notes"));
}

#[test]
fn large_corpus_keeps_relative_order_across_files() {
    // 500 records across 3 files; an empty query returns all of them in
    // the order they were ingested.
    let mut records = Vec::new();
    for i in 0..500u32 {
        let file = match i % 3 {
            0 => "one.xlsx",
            1 => "two.xlsx",
            _ => "three.xlsx",
        };
        records.push(record(
            &format!("Field{i}"),
            Some("Text"),
            None,
            file,
            2 + i / 3,
        ));
    }

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("catalog.db");
    let mut storage = CatalogStorage::open(&db_path).unwrap();
    storage.insert_records(&records).unwrap();
    drop(storage);

    let client = SearchClient::open(&tmp.path().join("no-index"), Some(&db_path))
        .unwrap()
        .unwrap();
    let results = client.search(&SearchQuery::default()).unwrap();
    assert_eq!(results, records);
}

#[test]
fn direct_matcher_and_clients_agree_on_every_single_record() {
    let tmp = TempDir::new().unwrap();
    let mut query = SearchQuery::default();
    query.set_term(CanonicalField::VisibilityRules, "admin");
    let results = assert_backends_agree(&tmp, &query);
    let expected = matcher::search(corpus(), &query, matcher::MAX_RESULTS);
    assert_eq!(results, expected);
}
