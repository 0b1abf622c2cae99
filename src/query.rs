//! Query compilation: free text → FTS5 match expression.
//!
//! The compiler turns what a user typed into a conjunction of prefix/exact
//! term clauses, so free text searches work without any query syntax.
//! Tokens are maximal runs of a single script: a run of CJK ideographs is
//! one token, a run of ASCII word characters is another, and adjacent runs
//! of different scripts stay separate tokens.

use crate::error::{Result, ShelfError};

/// One clause of a compiled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Match any indexed word beginning with the token.
    Prefix(String),
    /// Match the token exactly. Used for single-character tokens, where
    /// prefix matching is too noisy.
    Exact(String),
    /// Exact-phrase fallback when the query yields no tokens at all.
    Phrase(String),
}

/// Compiled, engine-executable representation of a user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    clauses: Vec<Clause>,
}

impl MatchQuery {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Render the FTS5 MATCH string. All clauses are ANDed: a page matches
    /// only if every token matches somewhere in its text.
    pub fn to_fts5(&self) -> String {
        self.clauses
            .iter()
            .map(|clause| match clause {
                Clause::Prefix(token) => format!("text:{}*", token),
                Clause::Exact(token) => format!("text:{}", token),
                Clause::Phrase(phrase) => {
                    format!("text:\"{}\"", phrase.replace('"', "\"\""))
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Compile raw query text.
pub fn compile(raw: &str) -> Result<MatchQuery> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(ShelfError::InvalidQuery("query is required".to_string()));
    }

    let tokens = tokenize(normalized);
    if tokens.is_empty() {
        // Pure punctuation/symbols: fall back to one exact phrase over the
        // whole query string.
        return Ok(MatchQuery {
            clauses: vec![Clause::Phrase(normalized.to_string())],
        });
    }

    let clauses = tokens
        .into_iter()
        .map(|token| {
            if token.chars().count() >= 2 {
                Clause::Prefix(token)
            } else {
                Clause::Exact(token)
            }
        })
        .collect();

    Ok(MatchQuery { clauses })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    /// ASCII alphanumerics and underscore.
    Word,
    /// CJK Unified Ideographs plus the iteration/closing marks 々〆〤.
    Ideograph,
    Hiragana,
    Katakana,
}

fn script_of(c: char) -> Option<Script> {
    match c {
        '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' => Some(Script::Word),
        '\u{4e00}'..='\u{9faf}' | '々' | '〆' | '〤' => Some(Script::Ideograph),
        '\u{3041}'..='\u{3094}' => Some(Script::Hiragana),
        '\u{30a1}'..='\u{30f4}' => Some(Script::Katakana),
        _ => None,
    }
}

/// Split text into maximal same-script runs.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_script: Option<Script> = None;

    for c in text.chars() {
        // The prolonged sound mark continues an open kana/ideograph run
        // (カード is one token); standalone it reads as Katakana.
        let script = if c == 'ー' {
            match current_script {
                Some(s) if s != Script::Word => Some(s),
                _ => Some(Script::Katakana),
            }
        } else {
            script_of(c)
        };

        match script {
            Some(s) if current_script == Some(s) => current.push(c),
            Some(s) => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current_script = Some(s);
                current.push(c);
            }
            None => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current_script = None;
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
