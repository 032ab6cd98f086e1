//! Tantivy BM25 relevance provider.
//!
//! Alternative to the FTS5 provider. Documents are indexed with the
//! English stemming tokenizer and the query parser boosts title and
//! details over the full text.

use std::path::{Path, PathBuf};

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::{debug, trace};

use crate::context::document::ScoringDocument;
use crate::error::{CtxError, Result};

use super::query::{or_of_quoted, query_terms};
use super::{FieldWeights, RelevanceProvider, RelevanceScores};

const WRITER_HEAP_BYTES: usize = 15_000_000;

/// Tantivy-backed [`RelevanceProvider`].
#[derive(Debug, Clone)]
pub struct TantivyRelevance {
    path: Option<PathBuf>,
    weights: FieldWeights,
    limit: usize,
}

impl TantivyRelevance {
    pub const fn in_memory(weights: FieldWeights, limit: usize) -> Self {
        Self {
            path: None,
            weights,
            limit,
        }
    }

    pub fn on_disk(path: impl Into<PathBuf>, weights: FieldWeights, limit: usize) -> Self {
        Self {
            path: Some(path.into()),
            weights,
            limit,
        }
    }
}

impl RelevanceProvider for TantivyRelevance {
    fn name(&self) -> &'static str {
        "tantivy"
    }

    fn search(
        &mut self,
        documents: &[ScoringDocument<'_>],
        query: &str,
    ) -> Result<RelevanceScores> {
        let terms = query_terms(query);
        if terms.is_empty() || documents.is_empty() {
            return Ok(RelevanceScores::new());
        }

        let mut session = match &self.path {
            Some(path) => TantivySession::open(path)?,
            None => TantivySession::open_in_memory()?,
        };
        session.rebuild(documents)?;
        session.search(&terms, &self.weights, self.limit)
    }
}

/// Field handles for the task schema.
#[derive(Clone, Copy)]
struct TaskFields {
    id: Field,
    title: Field,
    details: Field,
    full_text: Field,
}

/// An open Tantivy index with its writer. Dropping it releases the
/// writer lock.
pub struct TantivySession {
    index: Index,
    reader: IndexReader,
    writer: IndexWriter,
    fields: TaskFields,
}

impl TantivySession {
    /// Open or create an index directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            return Err(CtxError::IndexBuild(format!(
                "{} is a file, expected an index directory",
                path.display()
            )));
        }
        std::fs::create_dir_all(path)?;

        let index = if path.join("meta.json").exists() {
            Index::open_in_dir(path)?
        } else {
            Index::create_in_dir(path, build_schema())?
        };
        debug!(path = %path.display(), "opened tantivy index");
        Self::with_index(index)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_index(Index::create_in_ram(build_schema()))
    }

    fn with_index(index: Index) -> Result<Self> {
        let fields = extract_fields(&index.schema())?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;

        Ok(Self {
            index,
            reader,
            writer,
            fields,
        })
    }

    /// Replace the index contents with `documents`.
    pub fn rebuild(&mut self, documents: &[ScoringDocument<'_>]) -> Result<usize> {
        self.writer.delete_all_documents()?;
        for doc in documents {
            let mut entry = TantivyDocument::new();
            entry.add_text(self.fields.id, doc.id());
            entry.add_text(self.fields.title, doc.title());
            entry.add_text(self.fields.details, doc.details());
            entry.add_text(self.fields.full_text, &doc.full_text);
            self.writer.add_document(entry)?;
        }
        self.writer.commit()?;
        self.reader.reload()?;

        trace!(documents = documents.len(), "rebuilt tantivy index");
        Ok(documents.len())
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// OR-match `terms` across title, details and full text.
    #[allow(clippy::cast_possible_truncation)]
    pub fn search(
        &self,
        terms: &[String],
        weights: &FieldWeights,
        limit: usize,
    ) -> Result<RelevanceScores> {
        if terms.is_empty() || limit == 0 {
            return Ok(RelevanceScores::new());
        }

        let fields = self.fields;
        let mut parser =
            QueryParser::for_index(&self.index, vec![fields.title, fields.details, fields.full_text]);
        parser.set_field_boost(fields.title, weights.title as f32);
        parser.set_field_boost(fields.details, weights.details as f32);
        parser.set_field_boost(fields.full_text, weights.full_text as f32);

        let query = parser
            .parse_query(&or_of_quoted(terms))
            .map_err(|e| CtxError::QueryParse(format!("Failed to parse query: {e}")))?;

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut scores = RelevanceScores::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(id) = doc.get_first(fields.id).and_then(|v| v.as_str()) {
                scores.insert(id.to_string(), f64::from(score));
            }
        }
        trace!(hits = scores.len(), "tantivy search");
        Ok(scores)
    }
}

fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    let text_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer("en_stem")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );

    builder.add_text_field("id", STRING | STORED);
    builder.add_text_field("title", text_options.clone());
    builder.add_text_field("details", text_options.clone());
    builder.add_text_field("full_text", text_options);

    builder.build()
}

fn extract_fields(schema: &Schema) -> Result<TaskFields> {
    let field = |name: &str| {
        schema.get_field(name).map_err(|_| {
            CtxError::SearchIndex(tantivy::TantivyError::SchemaError(format!(
                "missing {name} field"
            )))
        })
    };

    Ok(TaskFields {
        id: field("id")?,
        title: field("title")?,
        details: field("details")?,
        full_text: field("full_text")?,
    })
}
