//! Maximal marginal relevance selection.
//!
//! Greedy: at each step pick the candidate maximizing
//! `lambda * score - (1 - lambda) * max_similarity_to_selected`, with
//! Jaccard similarity over token sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Pool size and diversity trade-off for the final selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Candidates kept after sorting by score, before MMR.
    pub candidate_pool: usize,
    /// 1.0 ranks purely by score, 0.0 purely by novelty.
    pub lambda: f64,
    /// Result size when the caller does not ask for one.
    pub default_k: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            candidate_pool: 30,
            lambda: 0.75,
            default_k: 8,
        }
    }
}

/// Anything MMR can choose between.
pub trait MmrCandidate {
    fn score(&self) -> f64;
    fn tokens(&self) -> &BTreeSet<String>;
}

/// Jaccard similarity of two token sets. Empty against empty is `0.0`.
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Select up to `k` candidates, trading score against redundancy.
///
/// Candidates are expected in descending score order; on equal MMR value
/// the earlier one wins, so `lambda = 1.0` reproduces the input order.
pub fn mmr_select<T: MmrCandidate>(candidates: Vec<T>, k: usize, lambda: f64) -> Vec<T> {
    let mut remaining = candidates;
    let mut selected: Vec<T> = Vec::with_capacity(k.min(remaining.len()));

    while selected.len() < k && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in remaining.iter().enumerate() {
            let max_similarity = selected
                .iter()
                .map(|chosen| jaccard(candidate.tokens(), chosen.tokens()))
                .fold(0.0, f64::max);
            let value = lambda * candidate.score() - (1.0 - lambda) * max_similarity;

            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((idx, value));
            }
        }

        let Some((idx, _)) = best else { break };
        selected.push(remaining.remove(idx));
    }

    selected
}
