//! Operating modes for context selection.

use serde::{Deserialize, Serialize};

/// What the consumer is trying to do, which drives both the eligibility
/// filter and the composite score formula.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Balance relevance, actionability and recency (default).
    #[default]
    Execute,
    /// Favor actionable work for planning.
    Plan,
    /// Only tasks with an open blocker.
    Unblock,
    /// Rank purely by recency.
    Recent,
    /// Only in-progress tasks.
    Wip,
}

impl ContextMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Plan => "plan",
            Self::Unblock => "unblock",
            Self::Recent => "recent",
            Self::Wip => "wip",
        }
    }
}

impl std::fmt::Display for ContextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
