//! taskctx context - Rank tasks and emit a compact context

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::cli::formatters::{TSV_HEADERS, format_context, tsv_row};
use crate::cli::output::{self, OutputFormat};
use crate::config::IndexConfig;
use crate::context::{ContextMode, ContextRequest, ContextResult, build_context};
use crate::error::Result;
use crate::search::{IndexBackend, build_provider};
use crate::tasks::TaskCollection;

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Path to the task collection JSON file
    #[arg(long)]
    pub task_file: PathBuf,

    /// Free-text query to focus the context
    #[arg(long)]
    pub query: Option<String>,

    /// Maximum number of tasks to return (default: selection.default_k)
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Ranking mode
    #[arg(long, value_enum, default_value_t = ContextMode::Execute)]
    pub mode: ContextMode,

    /// Keep the full-text index on disk at this path
    #[arg(long)]
    pub index_db: Option<PathBuf>,

    /// Full-text backend used for query relevance
    #[arg(long, value_enum)]
    pub backend: Option<IndexBackend>,

    /// Reference time for recency (RFC 3339, default: now)
    #[arg(long, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// Include per-task score breakdowns
    #[arg(long)]
    pub explain: bool,
}

fn parse_now(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

pub fn run(ctx: &AppContext, args: &ContextArgs) -> Result<()> {
    let collection = TaskCollection::load(&args.task_file)?;

    let index = index_config(ctx, args);
    let policy = ctx.config.ranking_policy();
    let mut provider = build_provider(&index, &policy.relevance);

    let mut request = ContextRequest::new(
        args.mode,
        args.query.clone().unwrap_or_default(),
        args.k.unwrap_or(policy.selection.default_k),
    )
    .with_explain(args.explain);
    if let Some(now) = args.now {
        request = request.with_now(now);
    }

    let result = build_context(&collection, &request, &policy, provider.as_mut());
    info!(
        mode = %request.mode,
        eligible = result.diagnostics.eligible,
        selected = result.tasks.len(),
        relevance = ?result.diagnostics.relevance,
        "context built"
    );

    emit(&result, ctx.output_format)
}

/// Config index settings with command-line overrides applied.
fn index_config(ctx: &AppContext, args: &ContextArgs) -> IndexConfig {
    let mut index = ctx.config.index.clone();
    if let Some(backend) = args.backend {
        index.backend = backend;
    }
    if let Some(path) = &args.index_db {
        index.path = Some(path.clone());
    }
    index
}

fn emit(result: &ContextResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::emit_json(result),
        OutputFormat::Jsonl => output::emit_jsonl(&result.tasks),
        OutputFormat::Tsv => {
            let rows: Vec<_> = result.tasks.iter().enumerate().collect();
            output::emit_tsv(&TSV_HEADERS, &rows, |(rank, item)| tsv_row(*rank, item));
            Ok(())
        }
        OutputFormat::Human | OutputFormat::Plain => {
            let rendered = format_context(result, format);
            if rendered.is_empty() && format == OutputFormat::Plain {
                return Ok(());
            }
            println!("{rendered}");
            Ok(())
        }
    }
}
