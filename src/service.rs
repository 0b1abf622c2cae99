//! Search service: validation, freshness, pagination, response shaping.
//!
//! Both entry points follow the same flow: validate pagination, compile the
//! query, attempt a throttled sync pass (best effort: a busy or throttled
//! engine means searching the existing, possibly slightly stale, index),
//! then execute the counted + paginated query.

use serde::Serialize;
use std::sync::Arc;

use crate::error::{Result, ShelfError};
use crate::index::{DocHit, IndexStore, PageHit};
use crate::query;
use crate::sync::SyncEngine;

/// Hard ceiling for `per_page`. Requests above it are clamped, not rejected.
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct CorpusSearchResponse {
    pub query: String,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    /// Number of rows on this page.
    pub count: usize,
    pub results: Vec<DocHit>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSearchResponse {
    pub query: String,
    pub id: String,
    pub title: String,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub count: usize,
    pub results: Vec<PageHit>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListing {
    pub id: String,
    pub title: String,
    pub page_count: i64,
}

pub struct SearchService {
    index: IndexStore,
    sync: Arc<SyncEngine>,
}

impl SearchService {
    pub fn new(index: IndexStore, sync: Arc<SyncEngine>) -> Self {
        Self { index, sync }
    }

    /// Corpus search: one result per matching document with a hit count.
    pub async fn search_corpus(
        &self,
        raw_query: &str,
        page: i64,
        per_page: i64,
    ) -> Result<CorpusSearchResponse> {
        let (page, per_page) = validate_pagination(page, per_page)?;
        let match_query = query::compile(raw_query)?;
        self.refresh_index().await;

        let total = self.index.count_documents(&match_query).await?;
        let offset = (page - 1) * per_page;
        let results = self
            .index
            .search_documents(&match_query, per_page, offset)
            .await?;

        Ok(CorpusSearchResponse {
            query: raw_query.to_string(),
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
            count: results.len(),
            results,
        })
    }

    /// Within-document search: per-page hits with snippets, best match
    /// first. `title` falls back to the raw document id on zero hits.
    pub async fn search_document(
        &self,
        raw_query: &str,
        doc_id: &str,
        page: i64,
        per_page: i64,
    ) -> Result<DocumentSearchResponse> {
        let (page, per_page) = validate_pagination(page, per_page)?;
        let match_query = query::compile(raw_query)?;
        self.refresh_index().await;

        let total = self.index.count_pages(&match_query, doc_id).await?;
        let offset = (page - 1) * per_page;
        let results = self
            .index
            .search_pages(&match_query, doc_id, per_page, offset)
            .await?;

        let title = results
            .first()
            .map(|hit| hit.title.clone())
            .unwrap_or_else(|| doc_id.to_string());

        Ok(DocumentSearchResponse {
            query: raw_query.to_string(),
            id: doc_id.to_string(),
            title,
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
            count: results.len(),
            results,
        })
    }

    /// All indexed documents, ordered by id.
    pub async fn list_documents(&self) -> Result<Vec<DocumentListing>> {
        self.refresh_index().await;
        let metas = self.index.list_documents().await?;
        Ok(metas
            .into_iter()
            .map(|meta| DocumentListing {
                title: meta.doc_id.clone(),
                id: meta.doc_id,
                page_count: meta.page_count,
            })
            .collect())
    }

    async fn refresh_index(&self) {
        // Best-effort freshness: stale results beat no results, so a failed
        // pass is logged and the query proceeds.
        if let Err(e) = self.sync.try_run_pass(false).await {
            tracing::warn!(error = %e, "sync pass failed; serving existing index");
        }
    }
}

fn validate_pagination(page: i64, per_page: i64) -> Result<(i64, i64)> {
    if page < 1 {
        return Err(ShelfError::InvalidArgument(
            "page must be >= 1".to_string(),
        ));
    }
    if per_page < 1 {
        return Err(ShelfError::InvalidArgument(
            "per_page must be >= 1".to_string(),
        ));
    }
    Ok((page, per_page.min(MAX_PER_PAGE)))
}

fn total_pages(total: i64, per_page: i64) -> i64 {
    if total > 0 {
        (total + per_page - 1) / per_page
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
    }

    #[test]
    fn total_pages_zero_total_is_zero() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(0, 1), 0);
    }

    #[test]
    fn pagination_rejects_out_of_range() {
        assert!(matches!(
            validate_pagination(0, 20),
            Err(ShelfError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_pagination(-3, 20),
            Err(ShelfError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_pagination(1, 0),
            Err(ShelfError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pagination_clamps_per_page() {
        assert_eq!(validate_pagination(1, 500).unwrap(), (1, 100));
        assert_eq!(validate_pagination(2, 100).unwrap(), (2, 100));
        assert_eq!(validate_pagination(2, 20).unwrap(), (2, 20));
    }
}
