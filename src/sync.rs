//! Incremental index synchronization.
//!
//! One pass reconciles the library directory against the index: documents
//! that vanished are removed first, then new or modified documents are
//! re-extracted and replaced. Unchanged documents (same mtime as recorded)
//! are skipped entirely.
//!
//! A pass is expensive, so the engine enforces a process-wide policy: at
//! most one pass in flight (a try-lock, so concurrent callers return
//! immediately instead of queueing), and non-forced passes are skipped
//! while the minimum interval since the last successful pass has not
//! elapsed.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::index::IndexStore;
use crate::reader::{clean_text, DocumentReader, PageText};
use crate::scanner;

/// What a `try_run_pass` call did.
#[derive(Debug)]
pub enum SyncOutcome {
    /// This caller ran a full pass.
    Ran(SyncReport),
    /// Another pass was already in flight; nothing was done.
    Busy,
    /// The minimum interval since the last successful pass has not elapsed.
    Throttled,
}

impl SyncOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, SyncOutcome::Ran(_))
    }
}

/// Counters for one completed pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub indexed: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Documents whose extraction failed this pass: `(id, reason)`. Their
    /// previous index state, if any, is untouched.
    pub failed: Vec<(String, String)>,
}

pub struct SyncEngine {
    index: IndexStore,
    reader: Arc<dyn DocumentReader>,
    root: PathBuf,
    extensions: Vec<String>,
    min_interval: Duration,
    exclusive: Mutex<()>,
    /// Unix millis of the last successful pass; 0 = never synced. Written
    /// only by the pass holder, so re-reading it under the lock is the
    /// authoritative check.
    last_success_ms: AtomicI64,
}

impl SyncEngine {
    pub fn new(index: IndexStore, reader: Arc<dyn DocumentReader>, config: &Config) -> Self {
        Self {
            index,
            reader,
            root: config.library.root.clone(),
            extensions: config.library.extensions.clone(),
            min_interval: Duration::from_secs(config.sync.min_interval_secs),
            exclusive: Mutex::new(()),
            last_success_ms: AtomicI64::new(0),
        }
    }

    /// Attempt a sync pass without blocking.
    ///
    /// Returns `Busy` when a pass is already in flight and `Throttled` when
    /// the interval has not elapsed (unless `force`). The interval is
    /// re-checked after acquiring exclusivity: two callers can both pass the
    /// first check before either records a new timestamp.
    pub async fn try_run_pass(&self, force: bool) -> Result<SyncOutcome> {
        if !force && !self.interval_elapsed() {
            return Ok(SyncOutcome::Throttled);
        }

        let Ok(_guard) = self.exclusive.try_lock() else {
            return Ok(SyncOutcome::Busy);
        };

        if !force && !self.interval_elapsed() {
            return Ok(SyncOutcome::Throttled);
        }

        let report = self.run_pass().await?;
        self.last_success_ms
            .store(chrono::Utc::now().timestamp_millis(), Ordering::SeqCst);
        Ok(SyncOutcome::Ran(report))
    }

    fn interval_elapsed(&self) -> bool {
        let last = self.last_success_ms.load(Ordering::SeqCst);
        if last == 0 {
            return true;
        }
        let elapsed = chrono::Utc::now().timestamp_millis() - last;
        elapsed >= self.min_interval.as_millis() as i64
    }

    async fn run_pass(&self) -> Result<SyncReport> {
        let disk = scanner::scan_library(&self.root, &self.extensions)?;
        let indexed = self.index.list_indexed_ids().await?;
        let mut report = SyncReport::default();

        // Removals first: a deleted file replaced by a same-named new one
        // must never stay indexed under stale metadata.
        let disk_ids: HashSet<&str> = disk.iter().map(|e| e.id.as_str()).collect();
        for id in &indexed {
            if !disk_ids.contains(id.as_str()) {
                self.index.remove_document(id).await?;
                tracing::info!(doc_id = %id, "removed vanished document from index");
                report.removed += 1;
            }
        }

        for entry in &disk {
            if let Some(meta) = self.index.get_meta(&entry.id).await? {
                if meta.mtime_ms == entry.mtime_ms {
                    report.unchanged += 1;
                    continue;
                }
            }

            let path = self.root.join(&entry.id);
            let raw_pages = match self.reader.read_pages(&path) {
                Ok(pages) => pages,
                Err(e) => {
                    tracing::warn!(doc_id = %entry.id, error = %e, "skipping unreadable document");
                    report.failed.push((entry.id.clone(), e.to_string()));
                    continue;
                }
            };

            let pages: Vec<PageText> = raw_pages
                .into_iter()
                .map(|p| PageText {
                    number: p.number,
                    text: clean_text(&p.text),
                })
                .collect();

            self.index
                .replace_document(&entry.id, entry.mtime_ms, &pages)
                .await?;
            report.indexed += 1;
        }

        tracing::debug!(
            indexed = report.indexed,
            removed = report.removed,
            unchanged = report.unchanged,
            failed = report.failed.len(),
            "sync pass complete"
        );
        Ok(report)
    }
}
