//! # papershelf
//!
//! A self-hosted full-text search service for a directory of PDF documents.
//!
//! papershelf keeps a SQLite FTS5 index synchronized with a mutable library
//! directory and answers ranked, paginated queries against it while files
//! are added, removed, or modified concurrently with query traffic.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────┐
//! │  Library   │──▶│ Sync Engine │──▶│  SQLite    │
//! │ (PDF dir)  │   │ scan+extract│   │   FTS5     │
//! └───────────┘   └────────────┘   └─────┬─────┘
//!                                        │
//!                      ┌─────────────────┤
//!                      ▼                 ▼
//!                 ┌─────────┐      ┌──────────┐
//!                 │   CLI    │      │   HTTP    │
//!                 │ (pshelf) │      │  (serve)  │
//!                 └─────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pshelf init                   # create database
//! pshelf sync --force           # index the library directory
//! pshelf search "invoice 2023"
//! pshelf serve                  # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`scanner`] | Library directory scanning |
//! | [`reader`] | Per-page document text extraction |
//! | [`query`] | Free text → FTS5 match expression |
//! | [`index`] | Document metadata + FTS index store |
//! | [`sync`] | Incremental index synchronization |
//! | [`service`] | Search orchestration and pagination |
//! | [`server`] | HTTP transport |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`stats`] | Index status summary |

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod migrate;
pub mod query;
pub mod reader;
pub mod scanner;
pub mod server;
pub mod service;
pub mod stats;
pub mod sync;

pub use error::ShelfError;
