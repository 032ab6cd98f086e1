//! Relevance providers.
//!
//! A provider scores documents against a free-text query. Each provider
//! builds its index inside a session scoped to one `search` call, so
//! nothing outlives the pipeline run:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │              build_context (eligible documents, query)         │
//! └────────────────────────────────────────────────────────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//! ┌────────────────────┐ ┌────────────────────┐ ┌────────────────────┐
//! │   FtsRelevance     │ │ TantivyRelevance   │ │    NoRelevance     │
//! │ (SQLite FTS5 bm25) │ │  (Tantivy BM25)    │ │ (substring only)   │
//! └────────────────────┘ └────────────────────┘ └────────────────────┘
//!            │                   │
//!            └─────────┬─────────┘
//!                      ▼
//!          id → score (higher is better)
//! ```

pub mod fts;
pub mod query;
pub mod tantivy;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndexConfig;
use crate::context::composite::RelevancePolicy;
use crate::context::document::ScoringDocument;
use crate::error::Result;

pub use self::fts::{FtsRelevance, FtsSession, SyncOutcome, content_hash};
pub use self::query::query_terms;
pub use self::tantivy::{TantivyRelevance, TantivySession};

/// Task id → relevance score. Absent ids have no provider opinion.
pub type RelevanceScores = HashMap<String, f64>;

/// Scores documents against a query.
pub trait RelevanceProvider {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Score `documents` for `query`. Higher is better; only matching
    /// documents need to appear in the result.
    fn search(&mut self, documents: &[ScoringDocument<'_>], query: &str)
    -> Result<RelevanceScores>;
}

/// Provider that never matches, leaving relevance to substring matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelevance;

impl RelevanceProvider for NoRelevance {
    fn name(&self) -> &'static str {
        "none"
    }

    fn search(&mut self, _: &[ScoringDocument<'_>], _: &str) -> Result<RelevanceScores> {
        Ok(RelevanceScores::new())
    }
}

/// Which full-text engine backs relevance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Fts5,
    Tantivy,
    None,
}

impl IndexBackend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fts5 => "fts5",
            Self::Tantivy => "tantivy",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for IndexBackend {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fts5" | "fts" | "sqlite" => Ok(Self::Fts5),
            "tantivy" => Ok(Self::Tantivy),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown index backend: {other}")),
        }
    }
}

impl std::fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field boosts shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub details: f64,
    pub full_text: f64,
}

impl FieldWeights {
    pub const fn from_policy(policy: &RelevancePolicy) -> Self {
        Self {
            title: policy.title_weight,
            details: policy.details_weight,
            full_text: policy.full_text_weight,
        }
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self::from_policy(&RelevancePolicy::default())
    }
}

/// Build the provider selected by `index`.
pub fn build_provider(index: &IndexConfig, relevance: &RelevancePolicy) -> Box<dyn RelevanceProvider> {
    let weights = FieldWeights::from_policy(relevance);
    let limit = relevance.provider_limit;
    debug!(backend = %index.backend, path = ?index.path, "building relevance provider");

    match index.backend {
        IndexBackend::Fts5 => match &index.path {
            Some(path) => Box::new(FtsRelevance::on_disk(
                path,
                index.reuse_unchanged,
                weights,
                limit,
            )),
            None => Box::new(FtsRelevance::in_memory(weights, limit)),
        },
        IndexBackend::Tantivy => match &index.path {
            Some(path) => Box::new(TantivyRelevance::on_disk(path, weights, limit)),
            None => Box::new(TantivyRelevance::in_memory(weights, limit)),
        },
        IndexBackend::None => Box::new(NoRelevance),
    }
}
