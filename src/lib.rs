pub mod indexer;
pub mod model;
pub mod schema;
pub mod search;
pub mod sources;
pub mod storage;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use indexer::IndexOptions;
use model::types::{CanonicalField, SearchQuery};
use search::query::SearchClient;
use search::tantivy::index_dir;
use storage::sqlite::CatalogStorage;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "field-catalog-search",
    version,
    about = "Searchable catalog of field definitions extracted from spreadsheet schemas"
)]
pub struct Cli {
    /// Path to the sqlite catalog (defaults to platform data dir)
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest spreadsheet exports into the catalog and index
    Index {
        /// Discard the existing catalog and index first
        #[arg(long)]
        full: bool,

        /// Watch the source directory and re-ingest on changes
        #[arg(long)]
        watch: bool,

        /// Directory holding the spreadsheet exports
        #[arg(long, default_value = "spreadsheets")]
        source_dir: PathBuf,
    },
    /// Run a multi-criteria partial-match query
    Search {
        /// Exact source file (extension appended if omitted)
        #[arg(long)]
        file: Option<String>,

        #[arg(long)]
        field_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        field_type: Option<String>,

        #[arg(long)]
        visibility_rules: Option<String>,

        #[arg(long)]
        visibility_attributes: Option<String>,

        /// Maximum results (hard-capped at 1000)
        #[arg(long, default_value_t = search::matcher::MAX_RESULTS)]
        limit: usize,

        /// Emit results as JSON instead of a summary table
        #[arg(long)]
        json: bool,
    },
    /// List source files known to the catalog
    Files,
    /// Debug: distinct fieldType values with counts
    FieldTypes,
    /// Debug: one sample record
    Sample,
    /// Report catalog and index document counts
    Health,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);
    let data_dir = default_data_dir();

    match cli.command {
        Commands::Index {
            full,
            watch,
            source_dir,
        } => indexer::run_index(IndexOptions {
            full,
            watch,
            db_path,
            data_dir,
            source_dir,
        }),
        Commands::Search {
            file,
            field_name,
            description,
            field_type,
            visibility_rules,
            visibility_attributes,
            limit,
            json,
        } => {
            let mut query = SearchQuery::default();
            if let Some(file) = &file {
                query.set_file(file);
            }
            let terms = [
                (CanonicalField::FieldName, field_name),
                (CanonicalField::Description, description),
                (CanonicalField::FieldType, field_type),
                (CanonicalField::VisibilityRules, visibility_rules),
                (CanonicalField::VisibilityAttributes, visibility_attributes),
            ];
            for (field, term) in terms {
                if let Some(term) = term {
                    query.set_term(field, &term);
                }
            }
            run_search(&db_path, &data_dir, &query, limit, json)
        }
        Commands::Files => {
            let storage = CatalogStorage::open(&db_path)?;
            for file in storage.distinct_files()? {
                println!("{file}");
            }
            Ok(())
        }
        Commands::FieldTypes => {
            let storage = CatalogStorage::open(&db_path)?;
            for (field_type, count) in storage.distinct_field_types()? {
                println!("{count:>6}  {field_type}");
            }
            Ok(())
        }
        Commands::Sample => {
            let storage = CatalogStorage::open(&db_path)?;
            match storage.sample_record()? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("catalog is empty"),
            }
            Ok(())
        }
        Commands::Health => run_health(&db_path, &data_dir),
    }
}

fn run_search(
    db_path: &Path,
    data_dir: &Path,
    query: &SearchQuery,
    limit: usize,
    json: bool,
) -> Result<()> {
    let index_path = index_dir(data_dir)?;
    let Some(client) = SearchClient::open(&index_path, Some(db_path))? else {
        anyhow::bail!("no catalog or index found; run `index` first");
    };
    let results = client.search_limited(query, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for record in &results {
            println!(
                "{}:{}  {}  {}",
                record.source_file,
                record.row_number,
                record.get(CanonicalField::FieldName).unwrap_or(""),
                record.get(CanonicalField::FieldType).unwrap_or(""),
            );
        }
        eprintln!("{} result(s)", results.len());
    }
    Ok(())
}

fn run_health(db_path: &Path, data_dir: &Path) -> Result<()> {
    match CatalogStorage::open(db_path) {
        Ok(storage) => println!("catalog: ok ({} records)", storage.record_count()?),
        Err(err) => println!("catalog: unavailable ({err})"),
    }
    let index_path = index_dir(data_dir)?;
    match tantivy::Index::open_in_dir(&index_path).and_then(|idx| idx.reader()) {
        Ok(reader) => println!("index: ok ({} documents)", reader.searcher().num_docs()),
        Err(err) => println!("index: unavailable ({err})"),
    }
    Ok(())
}

fn default_db_path() -> PathBuf {
    default_data_dir().join("catalog.db")
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "field-catalog-search", "field-catalog-search")
        .expect("project dirs available")
        .data_dir()
        .to_path_buf()
}
