//! E2E Scenario: ranking a checkout project's tasks across modes and backends.

use super::fixture::E2EFixture;
use taskctx::test_utils::fixtures::{TaskBuilder, sample_collection};

const NOW: &str = "2024-06-01T12:00:00Z";

#[test]
fn test_recent_mode_orders_by_freshness() {
    let mut fixture = E2EFixture::new("recent_mode", &sample_collection());

    fixture.log_step("Rank by recency only");
    let output = fixture.run_context(&["--mode", "recent", "--backend", "none", "--now", NOW]);
    fixture.assert_success(&output, "context --mode recent");

    let ids = output.ids();
    assert_eq!(ids.len(), 4);
    assert_eq!(&ids[..2], ["T-1", "T-2"]);
    assert_eq!(ids.last().map(String::as_str), Some("T-3"));

    fixture.generate_report();
}

#[test]
fn test_fts_index_is_reused_then_rebuilt() {
    let mut collection = sample_collection();
    let mut fixture = E2EFixture::new("fts_reuse", &collection);
    let index = fixture.index_path.display().to_string();

    fixture.log_step("First query builds the on-disk index");
    let output = fixture.run_context(&[
        "--query", "stripe", "--index-db", &index, "--now", NOW, "--explain",
    ]);
    fixture.assert_success(&output, "context --query stripe");
    fixture.checkpoint("after first build");
    assert!(fixture.index_path.exists());

    let json = output.json();
    assert_eq!(json["query"], "stripe");
    let tasks = json["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["id"], "T-1");
    let relevance = |id: &str| {
        tasks
            .iter()
            .find(|t| t["id"] == id)
            .map(|t| t["breakdown"]["relevance"].as_f64().unwrap())
            .unwrap()
    };
    assert!(relevance("T-1") > 0.0);
    assert!(relevance("T-3") > 0.0);
    assert!(relevance("T-2").abs() < f64::EPSILON);

    fixture.log_step("Same tasks, same answer");
    let again = fixture.run_context(&["--query", "stripe", "--index-db", &index, "--now", NOW]);
    fixture.assert_success(&again, "context (reuse)");
    assert_eq!(again.ids(), output.ids());

    fixture.log_step("Adding a task rebuilds the index");
    collection.tasks.push(
        TaskBuilder::new("T-6")
            .title("Stripe payouts")
            .details("Daily payout reconciliation")
            .build(),
    );
    fixture.write_tasks(&collection);
    let rebuilt = fixture.run_context(&["--query", "stripe", "--index-db", &index, "--now", NOW]);
    fixture.assert_success(&rebuilt, "context (rebuild)");
    fixture.checkpoint("after rebuild");
    assert!(rebuilt.ids().contains(&"T-6".to_string()));

    fixture.generate_report();
}

#[test]
fn test_tantivy_backend_scores_matching_tasks() {
    let mut fixture = E2EFixture::new("tantivy_backend", &sample_collection());

    fixture.log_step("In-memory tantivy index");
    let output = fixture.run_context(&[
        "--backend", "tantivy", "--query", "refund", "--now", NOW, "--explain",
    ]);
    fixture.assert_success(&output, "context --backend tantivy");

    let json = output.json();
    for task in json["tasks"].as_array().unwrap() {
        let relevance = task["breakdown"]["relevance"].as_f64().unwrap();
        if task["id"] == "T-3" {
            assert!(relevance > 0.0, "refund task should match");
        } else {
            assert!(relevance.abs() < f64::EPSILON, "{} should not match", task["id"]);
        }
    }

    fixture.generate_report();
}

#[test]
fn test_blank_query_behaves_like_no_query() {
    let mut fixture = E2EFixture::new("blank_query", &sample_collection());

    fixture.log_step("No query");
    let plain = fixture.run_context(&["--backend", "none", "--now", NOW, "--explain"]);
    fixture.assert_success(&plain, "context");

    fixture.log_step("Whitespace query");
    let blank = fixture.run_context(&["--backend", "none", "--query", "   ", "--now", NOW, "--explain"]);
    fixture.assert_success(&blank, "context --query '   '");

    assert_eq!(plain.ids(), blank.ids());
    for task in blank.json()["tasks"].as_array().unwrap() {
        let relevance = task["breakdown"]["relevance"].as_f64().unwrap();
        assert!((relevance - 1.0).abs() < f64::EPSILON);
    }

    fixture.generate_report();
}

#[test]
fn test_project_config_limits_result_size() {
    let mut fixture = E2EFixture::new("project_config", &sample_collection());
    fixture.write_project_config("[selection]\ndefault_k = 2\n\n[index]\nbackend = \"none\"\n");

    fixture.log_step("default_k from .taskctx/config.toml");
    let output = fixture.run_context(&["--now", NOW]);
    fixture.assert_success(&output, "context");
    assert_eq!(output.ids().len(), 2);

    fixture.log_step("-k overrides the config");
    let output = fixture.run_context(&["--now", NOW, "-k", "3"]);
    fixture.assert_success(&output, "context -k 3");
    assert_eq!(output.ids().len(), 3);

    fixture.generate_report();
}
