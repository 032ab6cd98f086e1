//! SQLite FTS5 relevance provider.
//!
//! Documents are indexed into an FTS5 table with the porter stemmer and
//! ranked with column-weighted `bm25()`. The index lives in memory unless a
//! path is configured; an on-disk index remembers a content hash so an
//! unchanged task set is not re-indexed.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::context::document::ScoringDocument;
use crate::error::{CtxError, Result};

use super::query::{or_of_quoted, query_terms};
use super::{FieldWeights, RelevanceProvider, RelevanceScores};

const SCHEMA: &str = "
CREATE VIRTUAL TABLE IF NOT EXISTS tasks_fts USING fts5(
    id UNINDEXED,
    title,
    details,
    full_text,
    tokenize = 'porter'
);
CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const CONTENT_HASH_KEY: &str = "content_hash";

/// FTS5-backed [`RelevanceProvider`].
#[derive(Debug, Clone)]
pub struct FtsRelevance {
    path: Option<PathBuf>,
    reuse_unchanged: bool,
    weights: FieldWeights,
    limit: usize,
}

impl FtsRelevance {
    pub const fn in_memory(weights: FieldWeights, limit: usize) -> Self {
        Self {
            path: None,
            reuse_unchanged: false,
            weights,
            limit,
        }
    }

    pub fn on_disk(
        path: impl Into<PathBuf>,
        reuse_unchanged: bool,
        weights: FieldWeights,
        limit: usize,
    ) -> Self {
        Self {
            path: Some(path.into()),
            reuse_unchanged,
            weights,
            limit,
        }
    }
}

impl RelevanceProvider for FtsRelevance {
    fn name(&self) -> &'static str {
        "fts5"
    }

    fn search(
        &mut self,
        documents: &[ScoringDocument<'_>],
        query: &str,
    ) -> Result<RelevanceScores> {
        let terms = query_terms(query);
        if terms.is_empty() || documents.is_empty() {
            return Ok(RelevanceScores::new());
        }

        let mut session = match &self.path {
            Some(path) => FtsSession::open(path)?,
            None => FtsSession::open_in_memory()?,
        };
        session.sync(documents, self.reuse_unchanged)?;
        session.search(&terms, &self.weights, self.limit)
    }
}

/// Result of bringing an index up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The stored content hash matched; nothing was written.
    Reused,
    /// The index was rebuilt with this many documents.
    Rebuilt(usize),
}

/// An open FTS5 index. Dropping it closes the connection.
pub struct FtsSession {
    conn: Connection,
}

impl FtsSession {
    /// Open (or create) an on-disk index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(CtxError::IndexBuild(format!(
                "{} is a directory, expected an index file",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        debug!(path = %path.display(), "opened fts index");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Make the index reflect `documents`.
    ///
    /// With `reuse_unchanged`, a matching stored content hash skips the
    /// rebuild.
    pub fn sync(
        &mut self,
        documents: &[ScoringDocument<'_>],
        reuse_unchanged: bool,
    ) -> Result<SyncOutcome> {
        let hash = content_hash(documents);
        if reuse_unchanged && self.stored_hash()?.as_deref() == Some(hash.as_str()) {
            debug!(documents = documents.len(), "fts index unchanged, reusing");
            return Ok(SyncOutcome::Reused);
        }

        let indexed = self.rebuild(documents, &hash)?;
        debug!(documents = indexed, "rebuilt fts index");
        Ok(SyncOutcome::Rebuilt(indexed))
    }

    fn rebuild(&mut self, documents: &[ScoringDocument<'_>], hash: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM tasks_fts", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks_fts (id, title, details, full_text) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for doc in documents {
                trace!(id = doc.id(), "indexing task");
                stmt.execute(params![doc.id(), doc.title(), doc.details(), doc.full_text])?;
            }
        }
        tx.execute(
            "INSERT INTO index_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![CONTENT_HASH_KEY, hash],
        )?;
        tx.commit()?;
        Ok(documents.len())
    }

    fn stored_hash(&self) -> Result<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                [CONTENT_HASH_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks_fts", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// OR-match `terms`, ranked by column-weighted bm25.
    pub fn search(
        &self,
        terms: &[String],
        weights: &FieldWeights,
        limit: usize,
    ) -> Result<RelevanceScores> {
        if terms.is_empty() || limit == 0 {
            return Ok(RelevanceScores::new());
        }

        // The leading 0.0 weights the unindexed id column.
        let mut stmt = self.conn.prepare(
            "SELECT id, bm25(tasks_fts, 0.0, ?1, ?2, ?3) AS rank
             FROM tasks_fts
             WHERE tasks_fts MATCH ?4
             ORDER BY rank
             LIMIT ?5",
        )?;
        let rows = stmt.query_map(
            params![
                weights.title,
                weights.details,
                weights.full_text,
                or_of_quoted(terms),
                i64::try_from(limit).unwrap_or(i64::MAX),
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
        )?;

        let mut scores = RelevanceScores::new();
        for row in rows {
            let (id, rank) = row?;
            // bm25() is lower-is-better.
            scores.insert(id, -rank);
        }
        trace!(hits = scores.len(), "fts search");
        Ok(scores)
    }
}

/// SHA-256 over id, title, details and full text of every document,
/// independent of input order.
pub fn content_hash(documents: &[ScoringDocument<'_>]) -> String {
    let mut ordered: Vec<&ScoringDocument<'_>> = documents.iter().collect();
    ordered.sort_by(|a, b| a.id().cmp(b.id()));

    let mut hasher = Sha256::new();
    for doc in ordered {
        for part in [doc.id(), doc.title(), doc.details(), doc.full_text.as_str()] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
