//! Shared test harness: a canned-page document reader plus a full
//! index/sync/service stack over a temporary library directory.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use papershelf::config::{Config, DbConfig, LibraryConfig, SearchConfig, ServerConfig, SyncConfig};
use papershelf::db;
use papershelf::index::IndexStore;
use papershelf::migrate;
use papershelf::reader::{DocumentReader, PageText, ReadError};
use papershelf::service::SearchService;
use papershelf::sync::SyncEngine;

/// Reader serving canned page text keyed by file name, so tests control
/// extraction without real PDFs.
pub struct FakeReader {
    pages: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    /// Number of `read_pages` calls, for asserting what a pass extracted.
    pub reads: AtomicUsize,
}

impl FakeReader {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set_pages(&self, id: &str, pages: &[&str]) {
        self.pages.lock().unwrap().insert(
            id.to_string(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn set_failing(&self, id: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(id.to_string());
        } else {
            set.remove(id);
        }
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }
}

impl DocumentReader for FakeReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageText>, ReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = *self.delay.lock().unwrap() {
            std::thread::sleep(delay);
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if self.failing.lock().unwrap().contains(&name) {
            return Err(ReadError::Open("simulated corrupt file".to_string()));
        }

        let pages = self
            .pages
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .unwrap_or_default();

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                number: i as u32 + 1,
                text,
            })
            .collect())
    }
}

pub struct Harness {
    pub tmp: TempDir,
    pub library: PathBuf,
    pub config: Config,
    pub index: IndexStore,
    pub engine: Arc<SyncEngine>,
    pub service: Arc<SearchService>,
    pub reader: Arc<FakeReader>,
}

impl Harness {
    pub async fn new(min_interval_secs: u64) -> Self {
        let tmp = TempDir::new().unwrap();
        let library = tmp.path().join("library");
        std::fs::create_dir_all(&library).unwrap();

        let config = Config {
            db: DbConfig {
                path: tmp.path().join("data").join("shelf.sqlite"),
            },
            library: LibraryConfig {
                root: library.clone(),
                extensions: vec![".pdf".to_string()],
            },
            sync: SyncConfig { min_interval_secs },
            search: SearchConfig::default(),
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
        };

        let pool = db::connect(&config).await.unwrap();
        migrate::ensure_schema(&pool).await.unwrap();

        let index = IndexStore::new(pool, config.search.clone());
        let reader = Arc::new(FakeReader::new());
        let engine = Arc::new(SyncEngine::new(
            index.clone(),
            reader.clone() as Arc<dyn DocumentReader>,
            &config,
        ));
        let service = Arc::new(SearchService::new(index.clone(), engine.clone()));

        Harness {
            tmp,
            library,
            config,
            index,
            engine,
            service,
            reader,
        }
    }

    /// Create or overwrite a library file and register its page text. Sleeps
    /// briefly first so a rewrite always lands on a different mtime.
    pub fn put_document(&self, id: &str, pages: &[&str]) {
        std::thread::sleep(Duration::from_millis(15));
        std::fs::write(self.library.join(id), id.as_bytes()).unwrap();
        self.reader.set_pages(id, pages);
    }

    pub fn remove_file(&self, id: &str) {
        std::fs::remove_file(self.library.join(id)).unwrap();
    }
}
