use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use notify::{RecursiveMode, Watcher, recommended_watcher};
use tracing::{info, warn};

use crate::schema::record::build_table;
use crate::schema::resolver::ResolvedSchema;
use crate::search::tantivy::{FieldIndex, index_dir};
use crate::sources::{CsvSource, ExcelSource, RawTable, RowSource, ScanContext};
use crate::storage::sqlite::CatalogStorage;

#[derive(Clone)]
pub struct IndexOptions {
    pub full: bool,
    pub watch: bool,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub source_dir: PathBuf,
}

pub fn run_index(opts: IndexOptions) -> Result<()> {
    index_once(&opts)?;

    if opts.watch {
        let opts_clone = opts.clone();
        watch_sources(&opts.source_dir, move || {
            if let Err(err) = index_once(&opts_clone) {
                warn!(error = %err, "watched rescan failed");
            }
        })?;
    }

    Ok(())
}

fn index_once(opts: &IndexOptions) -> Result<()> {
    let mut storage = CatalogStorage::open(&opts.db_path)?;
    let mut index = FieldIndex::open_or_create(&index_dir(&opts.data_dir)?)?;

    if opts.full {
        storage.reset()?;
        index.delete_all()?;
    }

    let ctx = ScanContext {
        source_dir: opts.source_dir.clone(),
    };
    let sources: Vec<(&'static str, Box<dyn RowSource>)> = vec![
        ("excel", Box::new(ExcelSource::new())),
        ("csv", Box::new(CsvSource::new())),
    ];

    for (name, source) in sources {
        let detect = source.detect(&ctx);
        info!(source = name, detected = detect.detected, "source_detect");
        if !detect.detected {
            continue;
        }
        let tables = source.scan(&ctx)?;
        let files = tables.len();
        ingest_batch(&mut storage, &mut index, &tables)?;
        info!(source = name, files, "source_ingest");
    }

    index.commit()?;
    info!(records = storage.record_count()?, "index_complete");
    Ok(())
}

fn ingest_batch(
    storage: &mut CatalogStorage,
    index: &mut FieldIndex,
    tables: &[RawTable],
) -> Result<()> {
    for table in tables {
        // Resolve once per file; every row of the file shares the schema.
        let schema = ResolvedSchema::resolve(&table.headers);
        if schema.is_empty() {
            warn!(file = %table.file_name, "no canonical headers resolved");
        }
        let records = build_table(&table.rows, &schema, &table.file_name);

        // Replace, not append: re-ingesting a file must not duplicate it.
        storage.delete_file(&table.file_name)?;
        index.delete_file(&table.file_name)?;

        let ids = storage.insert_records(&records)?;
        let pairs: Vec<_> = ids.into_iter().zip(records).collect();
        index.add_records(&pairs)?;
        info!(
            file = %table.file_name,
            rows = pairs.len(),
            resolved = schema.len(),
            "file_ingest"
        );
    }
    Ok(())
}

fn watch_sources<F: Fn() + Send + 'static>(source_dir: &Path, callback: F) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event.paths);
        }
    })?;
    watcher.watch(source_dir, RecursiveMode::Recursive)?;
    info!(dir = %source_dir.display(), "watching source directory");

    let debounce = Duration::from_secs(2);
    let mut last = Instant::now();
    loop {
        if let Ok(_paths) = rx.recv()
            && last.elapsed() >= debounce
        {
            callback();
            last = Instant::now();
        }
    }
}
