//! # papershelf CLI (`pshelf`)
//!
//! The `pshelf` binary is the primary interface for papershelf. It provides
//! commands for database initialization, index synchronization, search, and
//! starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! pshelf --config ./config/papershelf.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pshelf init` | Create the SQLite database and schema |
//! | `pshelf sync` | Reconcile the index with the library directory |
//! | `pshelf search "<query>"` | Search indexed documents |
//! | `pshelf status` | Print index statistics |
//! | `pshelf serve` | Start the HTTP search server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use papershelf::config::{self, Config};
use papershelf::db;
use papershelf::index::IndexStore;
use papershelf::migrate;
use papershelf::reader::PdfReader;
use papershelf::server;
use papershelf::service::SearchService;
use papershelf::stats;
use papershelf::sync::{SyncEngine, SyncOutcome};

/// papershelf — full-text search over a directory of PDF documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/papershelf.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "pshelf",
    about = "papershelf — full-text search over a directory of PDF documents",
    version,
    long_about = "papershelf maintains a SQLite FTS5 index over a directory of PDF documents, \
    reconciling the index incrementally as files are added, removed, or modified, and answers \
    ranked, paginated queries with per-page snippets via a CLI and an HTTP server."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/papershelf.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the document metadata table, and
    /// the FTS5 page index. Idempotent: running it multiple times is safe.
    Init,

    /// Reconcile the index with the library directory.
    ///
    /// Removes vanished documents, indexes new ones, and re-indexes
    /// documents whose modification time changed. Documents that fail
    /// extraction are reported and skipped; their previous index state is
    /// kept.
    Sync {
        /// Run even if the minimum sync interval has not elapsed.
        #[arg(long)]
        force: bool,
    },

    /// Search indexed documents.
    ///
    /// Without `--document`, returns one result per matching document
    /// ranked by how many of its pages match. With `--document`, returns
    /// per-page hits with snippets, best match first.
    Search {
        /// The search query string.
        query: String,

        /// Restrict the search to one document id (file name).
        #[arg(long)]
        document: Option<String>,

        /// Result page (1-based).
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Results per page (clamped to 100).
        #[arg(long = "per-page", default_value_t = 20)]
        per_page: i64,
    },

    /// Print index statistics.
    Status,

    /// Start the HTTP search server.
    ///
    /// Binds to the address configured in `[server].bind`. Search requests
    /// trigger throttled, best-effort index synchronization.
    Serve,
}

/// Build the shared index/sync/service stack over one pool.
async fn build_stack(config: &Config) -> anyhow::Result<(Arc<SearchService>, Arc<SyncEngine>)> {
    let pool = db::connect(config).await?;
    migrate::ensure_schema(&pool).await?;
    let index = IndexStore::new(pool, config.search.clone());
    let engine = Arc::new(SyncEngine::new(index.clone(), Arc::new(PdfReader), config));
    let service = Arc::new(SearchService::new(index, engine.clone()));
    Ok((service, engine))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papershelf=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync { force } => {
            let pool = db::connect(&cfg).await?;
            migrate::ensure_schema(&pool).await?;
            let index = IndexStore::new(pool.clone(), cfg.search.clone());
            let engine = SyncEngine::new(index, Arc::new(PdfReader), &cfg);

            match engine.try_run_pass(force).await? {
                SyncOutcome::Ran(report) => {
                    println!("sync library");
                    println!("  indexed: {}", report.indexed);
                    println!("  removed: {}", report.removed);
                    println!("  unchanged: {}", report.unchanged);
                    println!("  unreadable: {}", report.failed.len());
                    for (id, reason) in &report.failed {
                        println!("    {}: {}", id, reason);
                    }
                    println!("ok");
                }
                SyncOutcome::Throttled => {
                    println!("sync skipped: last pass ran recently (use --force)");
                }
                SyncOutcome::Busy => {
                    println!("sync skipped: another pass is in flight");
                }
            }
            pool.close().await;
        }
        Commands::Search {
            query,
            document,
            page,
            per_page,
        } => {
            let (service, _engine) = build_stack(&cfg).await?;

            match document {
                Some(doc_id) => {
                    let response = service
                        .search_document(&query, &doc_id, page, per_page)
                        .await?;
                    if response.results.is_empty() {
                        println!("No results.");
                        return Ok(());
                    }
                    println!(
                        "{} — {} matching page{} (page {}/{})",
                        response.title,
                        response.total,
                        if response.total == 1 { "" } else { "s" },
                        response.page,
                        response.total_pages
                    );
                    for hit in &response.results {
                        println!("  p.{} [{:.2}] {}", hit.page, hit.score, hit.snippet);
                    }
                }
                None => {
                    let response = service.search_corpus(&query, page, per_page).await?;
                    if response.results.is_empty() {
                        println!("No results.");
                        return Ok(());
                    }
                    println!(
                        "{} matching document{} (page {}/{})",
                        response.total,
                        if response.total == 1 { "" } else { "s" },
                        response.page,
                        response.total_pages
                    );
                    for (i, hit) in response.results.iter().enumerate() {
                        println!(
                            "{}. {} — {} matching page{}",
                            i + 1,
                            hit.title,
                            hit.hit_count,
                            if hit.hit_count == 1 { "" } else { "s" }
                        );
                    }
                }
            }
        }
        Commands::Status => {
            stats::run_status(&cfg).await?;
        }
        Commands::Serve => {
            let (service, engine) = build_stack(&cfg).await?;
            // Bring the index up to date before accepting traffic.
            if let SyncOutcome::Ran(report) = engine.try_run_pass(true).await? {
                tracing::info!(
                    indexed = report.indexed,
                    removed = report.removed,
                    unchanged = report.unchanged,
                    failed = report.failed.len(),
                    "startup sync complete"
                );
            }
            server::run_server(&cfg, service).await?;
        }
    }

    Ok(())
}
