use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub library: LibraryConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    /// Directory holding the documents to index.
    pub root: PathBuf,
    /// File name suffixes (case-insensitive) that count as documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![".pdf".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Minimum seconds between two non-forced sync passes. 0 disables the
    /// throttle.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
        }
    }
}

fn default_min_interval_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_snippet_open")]
    pub snippet_open: String,
    #[serde(default = "default_snippet_close")]
    pub snippet_close: String,
    #[serde(default = "default_snippet_ellipsis")]
    pub snippet_ellipsis: String,
    /// Context window for snippets, in tokens. FTS5 accepts 1..=64.
    #[serde(default = "default_snippet_tokens")]
    pub snippet_tokens: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snippet_open: default_snippet_open(),
            snippet_close: default_snippet_close(),
            snippet_ellipsis: default_snippet_ellipsis(),
            snippet_tokens: default_snippet_tokens(),
        }
    }
}

fn default_snippet_open() -> String {
    "[".to_string()
}
fn default_snippet_close() -> String {
    "]".to_string()
}
fn default_snippet_ellipsis() -> String {
    " ... ".to_string()
}
fn default_snippet_tokens() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.library.extensions.is_empty() {
        anyhow::bail!("library.extensions must not be empty");
    }
    for ext in &config.library.extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            anyhow::bail!(
                "library.extensions entries must be suffixes like \".pdf\", got '{}'",
                ext
            );
        }
    }

    if !(1..=64).contains(&config.search.snippet_tokens) {
        anyhow::bail!("search.snippet_tokens must be in 1..=64");
    }

    Ok(config)
}
