//! Context result formatter

use console::style;

use crate::cli::output::{HumanLayout, OutputFormat};
use crate::context::{ContextItem, ContextResult};

/// Column headers for TSV output.
pub const TSV_HEADERS: [&str; 8] = [
    "rank",
    "id",
    "score",
    "status",
    "priority",
    "progress",
    "open_blockers",
    "title",
];

/// Render a result for the human-facing formats.
pub fn format_context(result: &ContextResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format_plain(result),
        _ => format_human(result, format.use_colors()),
    }
}

fn format_human(result: &ContextResult, colors: bool) -> String {
    let mut layout = HumanLayout::new(colors);

    let heading = if result.project.is_empty() {
        "Task context".to_string()
    } else {
        format!("Task context: {}", result.project)
    };
    layout.title(&heading);
    if !result.description.is_empty() {
        layout.kv("description", &result.description);
    }
    layout.kv("mode", result.mode.as_str());
    if !result.query.trim().is_empty() {
        layout.kv("query", &result.query);
    }
    layout.blank();

    if result.tasks.is_empty() {
        layout.push_line("No matching tasks.");
        return layout.build();
    }

    for (rank, item) in result.tasks.iter().enumerate() {
        let header = format!("{}. [{}] {}", rank + 1, item.id, item.title);
        let score = format!("score {:.2}", item.score);
        let score = if colors {
            style(score).green().to_string()
        } else {
            score
        };
        layout.section(&format!("{header}  {score}"));
        layout.kv(
            "state",
            &format!(
                "{} | {} priority | {}%",
                item.status, item.priority, item.progress
            ),
        );
        if let Some(next) = item.next_action.as_deref().filter(|s| !s.is_empty()) {
            layout.kv("next", next);
        }
        if let Some(fallback) = item.if_blocked_then.as_deref().filter(|s| !s.is_empty()) {
            layout.kv("if blocked", fallback);
        }
        if item.open_blockers > 0 {
            layout.kv("open blockers", &item.open_blockers.to_string());
        }
        if let Some(breakdown) = &item.breakdown {
            layout.kv(
                "breakdown",
                &format!(
                    "relevance {:.3} | actionability {:.3} | recency {:.3}",
                    breakdown.relevance, breakdown.actionability, breakdown.recency
                ),
            );
        }
        let updates: Vec<&str> = item
            .recent_updates
            .iter()
            .map(|u| u.text())
            .filter(|t| !t.is_empty())
            .collect();
        if !updates.is_empty() {
            layout.kv("recent", "");
            for update in updates {
                layout.bullet(update);
            }
        }
        layout.blank();
    }

    layout.build().trim_end().to_string()
}

fn format_plain(result: &ContextResult) -> String {
    result
        .tasks
        .iter()
        .enumerate()
        .map(|(rank, item)| {
            format!(
                "{}. {} {:.2} {} {}",
                rank + 1,
                item.id,
                item.score,
                item.status,
                item.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One TSV row; tabs and newlines in free text are flattened to spaces.
pub fn tsv_row(rank: usize, item: &ContextItem) -> Vec<String> {
    vec![
        (rank + 1).to_string(),
        item.id.clone(),
        format!("{:.2}", item.score),
        item.status.to_string(),
        item.priority.to_string(),
        item.progress.to_string(),
        item.open_blockers.to_string(),
        item.title.replace(['\t', '\n'], " "),
    ]
}
