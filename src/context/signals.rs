//! Per-document signal scorers: actionability and recency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tasks::{Priority, TaskStatus};

use super::document::{ScoringDocument, epoch_seconds};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Weights for the actionability heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionabilityWeights {
    pub base: f64,
    pub in_progress_bonus: f64,
    pub blocked_penalty: f64,
    pub next_action_bonus: f64,
    pub priority_high: f64,
    pub priority_medium: f64,
    pub priority_low: f64,
    pub open_blocker_penalty: f64,
    /// Bonus for tasks that are started but not nearly finished.
    pub momentum_bonus: f64,
    pub momentum_min: i64,
    pub momentum_max: i64,
    pub floor: f64,
}

impl Default for ActionabilityWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            in_progress_bonus: 2.0,
            blocked_penalty: 1.0,
            next_action_bonus: 1.5,
            priority_high: 1.5,
            priority_medium: 0.5,
            priority_low: 0.0,
            open_blocker_penalty: 1.5,
            momentum_bonus: 0.5,
            momentum_min: 10,
            momentum_max: 90,
            floor: 0.1,
        }
    }
}

impl ActionabilityWeights {
    fn priority_bonus(&self, priority: &Priority) -> f64 {
        match priority {
            Priority::High => self.priority_high,
            Priority::Medium => self.priority_medium,
            Priority::Low | Priority::Other(_) => self.priority_low,
        }
    }
}

/// Exponential decay policy for recency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyPolicy {
    /// Days for the score to fall by a factor of `e`.
    pub decay_days: f64,
    /// Score for tasks with no parseable timestamp.
    pub unknown: f64,
}

impl Default for RecencyPolicy {
    fn default() -> Self {
        Self {
            decay_days: 14.0,
            unknown: 0.1,
        }
    }
}

/// How ready a task is to be worked on right now.
///
/// Additive over status, next action, priority, open blockers and
/// mid-range progress, never below `weights.floor`.
pub fn actionability(doc: &ScoringDocument<'_>, weights: &ActionabilityWeights) -> f64 {
    let mut score = weights.base;

    match doc.status() {
        TaskStatus::InProgress => score += weights.in_progress_bonus,
        TaskStatus::Blocked => score -= weights.blocked_penalty,
        _ => {}
    }
    if doc.next_action().is_some() {
        score += weights.next_action_bonus;
    }
    score += weights.priority_bonus(doc.priority());
    if doc.open_blockers > 0 {
        score -= weights.open_blocker_penalty;
    }
    let progress = doc.progress();
    if progress > weights.momentum_min && progress < weights.momentum_max {
        score += weights.momentum_bonus;
    }

    score.max(weights.floor)
}

/// Freshness of a task relative to `now`, in `(0, 1]`.
///
/// Timestamps in the future count as "now".
pub fn recency(doc: &ScoringDocument<'_>, now: DateTime<Utc>, policy: &RecencyPolicy) -> f64 {
    if doc.last_touch <= 0.0 {
        return policy.unknown;
    }
    let age_days = ((epoch_seconds(now) - doc.last_touch) / SECONDS_PER_DAY).max(0.0);
    (-age_days / policy.decay_days).exp().max(f64::MIN_POSITIVE)
}
