//! Task context ranking.
//!
//! Turns a task collection into a short, diverse, ranked list of tasks for
//! a given mode and optional query. See [`pipeline::build_context`].

pub mod composite;
pub mod document;
pub mod filter;
pub mod mmr;
pub mod mode;
pub mod pipeline;
pub mod signals;

pub use composite::{BlendWeights, CompositeScorer, RelevancePolicy, SignalSet, resolve_relevance};
pub use document::{ScoringDocument, parse_timestamp, tokenize};
pub use filter::eligible_tasks;
pub use mmr::{MmrCandidate, SelectionPolicy, jaccard, mmr_select};
pub use mode::ContextMode;
pub use pipeline::{
    ContextItem, ContextRequest, ContextResult, PipelineDiagnostics, RankingPolicy,
    RelevanceLookup, ScoreBreakdown, ScoredDocument, build_context,
};
pub use signals::{ActionabilityWeights, RecencyPolicy, actionability, recency};
