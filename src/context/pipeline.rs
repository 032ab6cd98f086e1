//! Context pipeline orchestration.
//!
//! filter → project → relevance → signals → composite → MMR. The pipeline
//! is infallible: relevance-provider failures degrade to substring
//! matching and are reported through [`PipelineDiagnostics`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::search::{RelevanceProvider, RelevanceScores};
use crate::tasks::{Priority, TaskCollection, TaskStatus, TaskUpdate};

use super::composite::{BlendWeights, CompositeScorer, RelevancePolicy, SignalSet, resolve_relevance};
use super::document::ScoringDocument;
use super::filter::eligible_tasks;
use super::mmr::{MmrCandidate, SelectionPolicy, mmr_select};
use super::mode::ContextMode;
use super::signals::{ActionabilityWeights, RecencyPolicy, actionability, recency};

/// Updates echoed back per selected task.
pub const RECENT_UPDATES_SHOWN: usize = 3;

/// Every tunable of the ranking pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub actionability: ActionabilityWeights,
    pub recency: RecencyPolicy,
    pub blend: BlendWeights,
    pub relevance: RelevancePolicy,
    pub selection: SelectionPolicy,
}

/// One invocation of the pipeline.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub mode: ContextMode,
    pub query: String,
    pub k: usize,
    /// Reference instant for recency.
    pub now: DateTime<Utc>,
    /// Attach a per-item score breakdown to the output.
    pub explain: bool,
}

impl ContextRequest {
    pub fn new(mode: ContextMode, query: impl Into<String>, k: usize) -> Self {
        Self {
            mode,
            query: query.into(),
            k,
            now: Utc::now(),
            explain: false,
        }
    }

    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub const fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// The raw query, or `None` when it is empty or whitespace.
    pub fn effective_query(&self) -> Option<&str> {
        (!self.query.trim().is_empty()).then_some(self.query.as_str())
    }
}

/// A document with its signals and composite score.
#[derive(Debug, Clone)]
pub struct ScoredDocument<'a> {
    pub document: ScoringDocument<'a>,
    pub signals: SignalSet,
    pub score: f64,
}

impl MmrCandidate for ScoredDocument<'_> {
    fn score(&self) -> f64 {
        self.score
    }

    fn tokens(&self) -> &BTreeSet<String> {
        &self.document.tokens
    }
}

/// What the relevance provider contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RelevanceLookup {
    /// No query, so no lookup.
    #[default]
    Skipped,
    /// The provider ran and matched nothing.
    NoData,
    /// The provider scored this many documents.
    Scored(usize),
    /// The provider failed; substring matching was used instead.
    Failed(String),
}

/// Counters describing one pipeline run. Not part of the serialized result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineDiagnostics {
    pub eligible: usize,
    /// Documents left after the zero-score drop, before pool truncation.
    pub candidates: usize,
    pub relevance: RelevanceLookup,
}

/// Per-item signal values, shown with `--explain`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub actionability: f64,
    pub recency: f64,
    pub composite: f64,
}

/// One selected task in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub progress: i64,
    pub score: f64,
    pub next_action: Option<String>,
    pub if_blocked_then: Option<String>,
    pub open_blockers: usize,
    pub recent_updates: Vec<TaskUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl ContextItem {
    fn from_scored(scored: &ScoredDocument<'_>, explain: bool) -> Self {
        let task = scored.document.task;
        let skip = task.updates.len().saturating_sub(RECENT_UPDATES_SHOWN);
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.clone(),
            status: task.status.clone(),
            progress: task.progress,
            score: round2(scored.score),
            next_action: task.next_action.clone(),
            if_blocked_then: task.if_blocked_then.clone(),
            open_blockers: scored.document.open_blockers,
            recent_updates: task.updates[skip..].to_vec(),
            breakdown: explain.then_some(ScoreBreakdown {
                relevance: scored.signals.relevance,
                actionability: scored.signals.actionability,
                recency: scored.signals.recency,
                composite: scored.score,
            }),
        }
    }
}

/// The pipeline's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    pub project: String,
    pub description: String,
    pub mode: ContextMode,
    pub query: String,
    pub tasks: Vec<ContextItem>,
    #[serde(skip)]
    pub diagnostics: PipelineDiagnostics,
}

impl ContextResult {
    fn new(
        collection: &TaskCollection,
        request: &ContextRequest,
        tasks: Vec<ContextItem>,
        diagnostics: PipelineDiagnostics,
    ) -> Self {
        Self {
            project: collection.project.clone(),
            description: collection.description.clone(),
            mode: request.mode,
            query: request.query.clone(),
            tasks,
            diagnostics,
        }
    }
}

/// Rank `collection` for `request` and return the diversified top `k`.
pub fn build_context(
    collection: &TaskCollection,
    request: &ContextRequest,
    policy: &RankingPolicy,
    provider: &mut dyn RelevanceProvider,
) -> ContextResult {
    let span = debug_span!("build_context", mode = %request.mode, k = request.k);
    let _enter = span.enter();

    let mut diagnostics = PipelineDiagnostics::default();

    let eligible = eligible_tasks(&collection.tasks, request.mode);
    diagnostics.eligible = eligible.len();
    debug!(
        total = collection.tasks.len(),
        eligible = eligible.len(),
        "filtered tasks"
    );
    if eligible.is_empty() {
        return ContextResult::new(collection, request, Vec::new(), diagnostics);
    }

    let documents: Vec<ScoringDocument<'_>> =
        eligible.into_iter().map(ScoringDocument::project).collect();

    let query = request.effective_query();
    let (scores, lookup) = lookup_relevance(provider, &documents, query);
    diagnostics.relevance = lookup;

    let signals: Vec<(f64, f64)> = documents
        .par_iter()
        .map(|doc| {
            (
                actionability(doc, &policy.actionability),
                recency(doc, request.now, &policy.recency),
            )
        })
        .collect();

    let scorer = CompositeScorer::new(&policy.blend);
    let mut scored: Vec<ScoredDocument<'_>> = documents
        .into_iter()
        .zip(signals)
        .map(|(document, (actionability, recency))| {
            let signals = SignalSet {
                relevance: resolve_relevance(&document, query, &scores, &policy.relevance),
                actionability,
                recency,
            };
            let score = scorer.score(request.mode, query.is_some(), &signals);
            ScoredDocument {
                document,
                signals,
                score,
            }
        })
        .collect();

    if query.is_some() {
        scored.retain(|doc| doc.score > 0.0);
    }
    diagnostics.candidates = scored.len();

    // Stable: equal scores keep eligibility order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(policy.selection.candidate_pool);
    debug!(candidates = scored.len(), "scored candidates");

    let selected = mmr_select(scored, request.k, policy.selection.lambda);
    debug!(selected = selected.len(), "selected context");

    let tasks = selected
        .iter()
        .map(|doc| ContextItem::from_scored(doc, request.explain))
        .collect();
    ContextResult::new(collection, request, tasks, diagnostics)
}

fn lookup_relevance(
    provider: &mut dyn RelevanceProvider,
    documents: &[ScoringDocument<'_>],
    query: Option<&str>,
) -> (RelevanceScores, RelevanceLookup) {
    let Some(query) = query else {
        return (RelevanceScores::new(), RelevanceLookup::Skipped);
    };

    match provider.search(documents, query) {
        Ok(scores) if scores.is_empty() => (scores, RelevanceLookup::NoData),
        Ok(scores) => {
            let scored = scores.len();
            debug!(provider = provider.name(), scored, "relevance lookup");
            (scores, RelevanceLookup::Scored(scored))
        }
        Err(err) => {
            warn!(
                provider = provider.name(),
                error = %err,
                "relevance lookup failed, falling back to substring matching"
            );
            (RelevanceScores::new(), RelevanceLookup::Failed(err.to_string()))
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
