//! Mode-dependent blending of relevance, actionability and recency.

use serde::{Deserialize, Serialize};

use crate::search::RelevanceScores;

use super::document::ScoringDocument;
use super::mode::ContextMode;

/// Blend weights per mode family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub execute_query_relevance: f64,
    pub execute_query_actionability: f64,
    pub execute_query_recency: f64,
    pub execute_plain_actionability: f64,
    pub execute_plain_recency: f64,
    pub plan_actionability: f64,
    pub plan_recency: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            execute_query_relevance: 0.4,
            execute_query_actionability: 0.4,
            execute_query_recency: 0.2,
            execute_plain_actionability: 0.6,
            execute_plain_recency: 0.4,
            plan_actionability: 0.8,
            plan_recency: 0.2,
        }
    }
}

/// How relevance is resolved when the provider has nothing to say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevancePolicy {
    /// Relevance of every document when there is no query.
    pub no_query: f64,
    /// Relevance when the raw query appears verbatim in the full text.
    pub substring_fallback: f64,
    /// Maximum number of hits requested from a provider.
    pub provider_limit: usize,
    pub title_weight: f64,
    pub details_weight: f64,
    pub full_text_weight: f64,
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self {
            no_query: 1.0,
            substring_fallback: 0.5,
            provider_limit: 50,
            title_weight: 10.0,
            details_weight: 5.0,
            full_text_weight: 1.0,
        }
    }
}

/// The three signals for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSet {
    pub relevance: f64,
    pub actionability: f64,
    pub recency: f64,
}

/// Combines a [`SignalSet`] into a single score.
pub struct CompositeScorer<'w> {
    weights: &'w BlendWeights,
}

impl<'w> CompositeScorer<'w> {
    pub const fn new(weights: &'w BlendWeights) -> Self {
        Self { weights }
    }

    /// `has_query` only affects the execute-style modes; `recent` and
    /// `plan` ignore relevance entirely.
    pub fn score(&self, mode: ContextMode, has_query: bool, signals: &SignalSet) -> f64 {
        let w = self.weights;
        match mode {
            ContextMode::Recent => signals.recency,
            ContextMode::Plan => {
                w.plan_actionability * signals.actionability + w.plan_recency * signals.recency
            }
            ContextMode::Execute | ContextMode::Unblock | ContextMode::Wip if has_query => {
                w.execute_query_relevance * signals.relevance
                    + w.execute_query_actionability * signals.actionability
                    + w.execute_query_recency * signals.recency
            }
            ContextMode::Execute | ContextMode::Unblock | ContextMode::Wip => {
                w.execute_plain_actionability * signals.actionability
                    + w.execute_plain_recency * signals.recency
            }
        }
    }
}

/// Relevance of `doc` for `query`.
///
/// Without a query every document gets `policy.no_query`. Otherwise a
/// positive provider score wins; a missing or zero score falls back to a
/// case-insensitive substring match of the raw query against the full text.
pub fn resolve_relevance(
    doc: &ScoringDocument<'_>,
    query: Option<&str>,
    scores: &RelevanceScores,
    policy: &RelevancePolicy,
) -> f64 {
    let Some(query) = query else {
        return policy.no_query;
    };

    match scores.get(doc.id()) {
        Some(&score) if score != 0.0 => score,
        _ if doc
            .full_text
            .to_lowercase()
            .contains(&query.to_lowercase()) =>
        {
            policy.substring_fallback
        }
        _ => 0.0,
    }
}
