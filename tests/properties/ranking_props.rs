//! Property-based tests for the ranking pipeline's structural guarantees.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use taskctx::context::{
    ActionabilityWeights, ContextMode, ContextRequest, MmrCandidate, RankingPolicy,
    RecencyPolicy, ScoringDocument, actionability, build_context, jaccard, mmr_select, recency,
};
use taskctx::search::NoRelevance;
use taskctx::tasks::{Task, TaskCollection};
use taskctx::test_utils::fixtures::{TaskBuilder, fixed_now};

const WORDS: &[&str] = &[
    "payments", "login", "refund", "stripe", "oauth", "docs", "cart", "tax", "webhook", "api",
];
const STATUSES: &[&str] = &["pending", "in-progress", "blocked", "done", "canceled", "review"];
const PRIORITIES: &[&str] = &["high", "medium", "low", "urgent"];
const BLOCKER_STATES: &[&str] = &["open", "resolved"];

fn arb_mode() -> impl Strategy<Value = ContextMode> {
    prop_oneof![
        Just(ContextMode::Execute),
        Just(ContextMode::Plan),
        Just(ContextMode::Unblock),
        Just(ContextMode::Recent),
        Just(ContextMode::Wip),
    ]
}

fn arb_words(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..max).prop_map(|w| w.join(" "))
}

fn arb_task(id: usize) -> impl Strategy<Value = Task> {
    (
        prop::sample::select(STATUSES),
        prop::sample::select(PRIORITIES),
        0i64..=100,
        arb_words(4),
        arb_words(8),
        prop::collection::vec(prop::sample::select(BLOCKER_STATES), 0..3),
        prop::option::of(0i64..60),
    )
        .prop_map(move |(status, priority, progress, title, details, blockers, age)| {
            let mut builder = TaskBuilder::new(&format!("T-{id}"))
                .status(status)
                .priority(priority)
                .progress(progress)
                .title(&title)
                .details(&details);
            for (i, state) in blockers.into_iter().enumerate() {
                builder = builder.blocker(&format!("blocker {i}"), state);
            }
            if let Some(days) = age {
                let at = fixed_now() - chrono::Duration::days(days);
                builder = builder.created(&at.to_rfc3339());
            }
            builder.build()
        })
}

fn arb_collection() -> impl Strategy<Value = TaskCollection> {
    (0usize..40)
        .prop_flat_map(|n| (0..n).map(arb_task).collect::<Vec<_>>())
        .prop_map(|tasks| TaskCollection {
            project: "prop".to_string(),
            description: String::new(),
            tasks,
        })
}

#[derive(Debug, Clone)]
struct Candidate {
    score: f64,
    tokens: BTreeSet<String>,
}

impl MmrCandidate for Candidate {
    fn score(&self) -> f64 {
        self.score
    }

    fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }
}

fn arb_candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(
        (0.0f64..10.0, prop::collection::btree_set(prop::sample::select(WORDS), 0..5)),
        0..20,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(score, words)| Candidate {
                score,
                tokens: words.into_iter().map(str::to_string).collect(),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn context_selects_at_most_k_distinct_open_tasks(
        collection in arb_collection(),
        mode in arb_mode(),
        k in 0usize..12,
        query in arb_words(3),
    ) {
        let request = ContextRequest::new(mode, query, k).with_now(fixed_now());
        let result = build_context(&collection, &request, &RankingPolicy::default(), &mut NoRelevance);

        prop_assert!(result.tasks.len() <= k);
        prop_assert!(result.tasks.len() <= result.diagnostics.eligible);

        let ids: HashSet<&str> = result.tasks.iter().map(|t| t.id.as_str()).collect();
        prop_assert_eq!(ids.len(), result.tasks.len());

        for item in &result.tasks {
            let task = collection.tasks.iter().find(|t| t.id == item.id).unwrap();
            prop_assert!(!task.status.is_closed());
            match mode {
                ContextMode::Unblock => prop_assert!(task.has_open_blocker()),
                ContextMode::Wip => prop_assert_eq!(task.status.as_str(), "in-progress"),
                _ => {}
            }
            prop_assert!(item.score.is_finite());
        }
    }

    #[test]
    fn context_without_query_fills_k(collection in arb_collection(), k in 1usize..12) {
        let request = ContextRequest::new(ContextMode::Execute, "", k).with_now(fixed_now());
        let result = build_context(&collection, &request, &RankingPolicy::default(), &mut NoRelevance);
        let pool = RankingPolicy::default().selection.candidate_pool;
        prop_assert_eq!(result.tasks.len(), k.min(result.diagnostics.eligible).min(pool));
    }

    #[test]
    fn actionability_respects_floor(task in arb_task(0)) {
        let weights = ActionabilityWeights::default();
        let score = actionability(&ScoringDocument::project(&task), &weights);
        prop_assert!(score >= weights.floor);
    }

    #[test]
    fn recency_is_bounded_and_monotonic(older in 0i64..400, gap in 0i64..400) {
        let now = fixed_now();
        let policy = RecencyPolicy::default();
        let stale = TaskBuilder::new("stale")
            .created(&(now - chrono::Duration::days(older + gap)).to_rfc3339())
            .build();
        let fresh = TaskBuilder::new("fresh")
            .created(&(now - chrono::Duration::days(older)).to_rfc3339())
            .build();

        let stale_score = recency(&ScoringDocument::project(&stale), now, &policy);
        let fresh_score = recency(&ScoringDocument::project(&fresh), now, &policy);
        prop_assert!(stale_score > 0.0 && stale_score <= 1.0);
        prop_assert!(fresh_score > 0.0 && fresh_score <= 1.0);
        prop_assert!(fresh_score >= stale_score);
    }

    #[test]
    fn context_is_idempotent(collection in arb_collection(), mode in arb_mode(), query in arb_words(2)) {
        let request = ContextRequest::new(mode, query, 8).with_now(fixed_now());
        let policy = RankingPolicy::default();
        let first = build_context(&collection, &request, &policy, &mut NoRelevance);
        let second = build_context(&collection, &request, &policy, &mut NoRelevance);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn mmr_returns_prefix_sized_selection(candidates in arb_candidates(), k in 0usize..25) {
        let n = candidates.len();
        let selected = mmr_select(candidates, k, 0.75);
        prop_assert_eq!(selected.len(), k.min(n));
    }

    #[test]
    fn mmr_keeps_identical_pair_apart(
        score in 0.1f64..10.0,
        lambda in 0.0f64..1.0,
        k in 2usize..6,
        distinct_at in 0usize..3,
        words in prop::collection::btree_set(prop::sample::select(WORDS), 1..5),
    ) {
        let shared: BTreeSet<String> = words.into_iter().map(str::to_string).collect();
        let other: BTreeSet<String> = ["ledger", "schema"].into_iter().map(str::to_string).collect();
        let mut candidates = vec![
            Candidate { score, tokens: shared.clone() },
            Candidate { score, tokens: shared.clone() },
        ];
        candidates.insert(distinct_at, Candidate { score, tokens: other.clone() });

        let selected = mmr_select(candidates, k, lambda);
        let first_two: Vec<bool> = selected.iter().take(2).map(|c| c.tokens == shared).collect();
        prop_assert_eq!(first_two.iter().filter(|&&dup| dup).count(), 1);
        prop_assert!(selected.iter().take(2).any(|c| c.tokens == other));
    }

    #[test]
    fn mmr_with_lambda_one_keeps_input_order(candidates in arb_candidates()) {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        let expected: Vec<f64> = sorted.iter().map(|c| c.score).collect();
        let selected = mmr_select(sorted, usize::MAX, 1.0);
        let actual: Vec<f64> = selected.iter().map(|c| c.score).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn jaccard_is_symmetric_and_bounded(a in arb_candidates(), b in arb_candidates()) {
        for (x, y) in a.iter().zip(b.iter()) {
            let forward = jaccard(&x.tokens, &y.tokens);
            let backward = jaccard(&y.tokens, &x.tokens);
            prop_assert!((forward - backward).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&forward));
        }
    }
}
