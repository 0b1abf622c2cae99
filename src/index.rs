//! SQLite index store: document metadata plus the page-level FTS index.
//!
//! Two tables back the whole system: `documents` (one row per indexed
//! document; its presence means "currently indexed") and `pages_fts` (one
//! FTS5 row per non-empty page). The sync engine is the only writer; search
//! runs read-only against the same pool.
//!
//! `replace_document` and `remove_document` are single transactions, so a
//! concurrent reader sees either the fully-old or the fully-new page set of
//! a document, never a partial replace.

use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::query::MatchQuery;
use crate::reader::PageText;

/// Metadata row for one indexed document.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub doc_id: String,
    pub mtime_ms: i64,
    pub page_count: i64,
    /// Unix seconds of the last index write for this document.
    pub updated_at: i64,
}

/// Grouped (per-document) search hit.
#[derive(Debug, Clone, Serialize)]
pub struct DocHit {
    pub id: String,
    pub title: String,
    pub hit_count: i64,
}

/// Per-page search hit within one document.
#[derive(Debug, Clone, Serialize)]
pub struct PageHit {
    pub id: String,
    pub title: String,
    pub page: i64,
    pub snippet: String,
    /// BM25 score from FTS5; lower is a better match.
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub documents: i64,
    pub pages: i64,
    /// Unix seconds of the most recent index write, if any.
    pub last_updated: Option<i64>,
}

#[derive(Clone)]
pub struct IndexStore {
    pool: SqlitePool,
    search: SearchConfig,
}

impl IndexStore {
    pub fn new(pool: SqlitePool, search: SearchConfig) -> Self {
        Self { pool, search }
    }

    pub async fn get_meta(&self, doc_id: &str) -> Result<Option<DocumentMeta>> {
        let row = sqlx::query(
            "SELECT doc_id, mtime_ms, page_count, updated_at FROM documents WHERE doc_id = ?",
        )
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DocumentMeta {
            doc_id: row.get("doc_id"),
            mtime_ms: row.get("mtime_ms"),
            page_count: row.get("page_count"),
            updated_at: row.get("updated_at"),
        }))
    }

    pub async fn list_indexed_ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar("SELECT doc_id FROM documents ORDER BY doc_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentMeta>> {
        let rows = sqlx::query(
            "SELECT doc_id, mtime_ms, page_count, updated_at FROM documents ORDER BY doc_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DocumentMeta {
                doc_id: row.get("doc_id"),
                mtime_ms: row.get("mtime_ms"),
                page_count: row.get("page_count"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }

    /// Replace a document's indexed pages and metadata in one transaction.
    ///
    /// `pages` is the full cleaned page set; empty pages count toward
    /// `page_count` but are not stored. All-or-nothing: on failure the
    /// previous committed state survives.
    pub async fn replace_document(
        &self,
        doc_id: &str,
        mtime_ms: i64,
        pages: &[PageText],
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pages_fts WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&mut *tx)
            .await?;

        for page in pages {
            if page.text.is_empty() {
                continue;
            }
            sqlx::query("INSERT INTO pages_fts (doc_id, title, page, text) VALUES (?, ?, ?, ?)")
                .bind(doc_id)
                .bind(doc_id)
                .bind(page.number as i64)
                .bind(&page.text)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO documents (doc_id, mtime_ms, page_count, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(doc_id) DO UPDATE SET
                mtime_ms = excluded.mtime_ms,
                page_count = excluded.page_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(doc_id)
        .bind(mtime_ms)
        .bind(pages.len() as i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(doc_id, pages = pages.len(), "replaced document in index");
        Ok(())
    }

    /// Drop a document's pages and metadata in one transaction.
    pub async fn remove_document(&self, doc_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pages_fts WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM documents WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(doc_id, "removed document from index");
        Ok(())
    }

    /// Grouped search: one row per matching document, ranked by how many of
    /// its pages match, ties broken by title.
    pub async fn search_documents(
        &self,
        query: &MatchQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocHit>> {
        let rows = sqlx::query(
            r#"
            SELECT
                doc_id,
                title,
                COUNT(*) AS hit_count
            FROM pages_fts
            WHERE pages_fts MATCH ?
            GROUP BY doc_id, title
            ORDER BY hit_count DESC, title ASC
            LIMIT ?
            OFFSET ?
            "#,
        )
        .bind(query.to_fts5())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DocHit {
                id: row.get("doc_id"),
                title: row.get("title"),
                hit_count: row.get("hit_count"),
            })
            .collect())
    }

    pub async fn count_documents(&self, query: &MatchQuery) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM (
                SELECT doc_id
                FROM pages_fts
                WHERE pages_fts MATCH ?
                GROUP BY doc_id
            ) g
            "#,
        )
        .bind(query.to_fts5())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Per-page search scoped to one document, best match first
    /// (ascending BM25), with a snippet around the strongest match.
    pub async fn search_pages(
        &self,
        query: &MatchQuery,
        doc_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PageHit>> {
        let rows = sqlx::query(
            r#"
            SELECT
                doc_id,
                title,
                page,
                snippet(pages_fts, 3, ?, ?, ?, ?) AS snippet,
                bm25(pages_fts) AS score
            FROM pages_fts
            WHERE pages_fts MATCH ? AND doc_id = ?
            ORDER BY score
            LIMIT ?
            OFFSET ?
            "#,
        )
        .bind(&self.search.snippet_open)
        .bind(&self.search.snippet_close)
        .bind(&self.search.snippet_ellipsis)
        .bind(self.search.snippet_tokens as i64)
        .bind(query.to_fts5())
        .bind(doc_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PageHit {
                id: row.get("doc_id"),
                title: row.get("title"),
                page: row.get("page"),
                snippet: row.get("snippet"),
                score: row.get("score"),
            })
            .collect())
    }

    pub async fn count_pages(&self, query: &MatchQuery, doc_id: &str) -> Result<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pages_fts WHERE pages_fts MATCH ? AND doc_id = ?")
                .bind(query.to_fts5())
                .bind(doc_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        let pages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages_fts")
            .fetch_one(&self.pool)
            .await?;
        let last_updated: Option<i64> = sqlx::query_scalar("SELECT MAX(updated_at) FROM documents")
            .fetch_one(&self.pool)
            .await?;

        Ok(IndexStats {
            documents,
            pages,
            last_updated,
        })
    }
}
