//! Data models for repository reviews.
//!
//! This module contains the core data structures that flow through the
//! pipeline: loaded documents, the corpus, per-topic outcomes and the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chunk of text loaded from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path of the originating file (relative to repo root).
    pub source: String,
    /// Text content of the chunk.
    pub content: String,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// Ordered collection of documents sent to the model.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Separator placed between documents in the content blob.
    pub const SEPARATOR: &'static str = "\n\n";

    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct source files in the corpus.
    pub fn source_count(&self) -> usize {
        let mut sources: Vec<&str> = self.documents().iter().map(|d| d.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();
        sources.len()
    }

    /// Join all document contents into one blob, in corpus order.
    pub fn joined_content(&self) -> String {
        self.documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }
}

impl From<Vec<Document>> for Corpus {
    fn from(documents: Vec<Document>) -> Self {
        Self::new(documents)
    }
}

/// Outcome of a single topic analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum TopicOutcome {
    /// The model answered with this text.
    Completed(String),
    /// The backend call failed with this message.
    Failed(String),
}

impl TopicOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, TopicOutcome::Failed(_))
    }
}

/// A topic paired with its analysis outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResult {
    pub topic: String,
    pub outcome: TopicOutcome,
}

impl TopicResult {
    pub fn completed(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            outcome: TopicOutcome::Completed(text.into()),
        }
    }

    pub fn failed(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            outcome: TopicOutcome::Failed(message.into()),
        }
    }

    /// Body text shown in the report for this topic.
    pub fn body(&self) -> String {
        match &self.outcome {
            TopicOutcome::Completed(text) => text.clone(),
            TopicOutcome::Failed(message) => format!("Error during analysis: {}", message),
        }
    }

    /// Markdown section for this topic.
    pub fn markdown_section(&self) -> String {
        format!("## {}\n{}\n", self.topic, self.body())
    }
}

impl fmt::Display for TopicResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.outcome {
            TopicOutcome::Completed(_) => "ok",
            TopicOutcome::Failed(_) => "failed",
        };
        write!(f, "{} [{}]", self.topic, status)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// URL of the analyzed repository.
    pub repo_url: String,
    /// Short hash of the analyzed commit, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Name of the analysis profile used.
    pub profile: String,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Date and time of the analysis.
    pub generated_at: DateTime<Utc>,
    /// Number of distinct files that contributed chunks.
    pub files_loaded: usize,
    /// Number of chunks in the corpus.
    pub chunks_loaded: usize,
    /// Duration of the pipeline in seconds.
    pub duration_seconds: f64,
}

/// The complete review report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Results in profile order.
    pub results: Vec<TopicResult>,
}

impl Report {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_content_uses_blank_line() {
        let corpus = Corpus::new(vec![
            Document::new("a.py", "first"),
            Document::new("b.py", "second"),
        ]);
        assert_eq!(corpus.joined_content(), "first\n\nsecond");
    }

    #[test]
    fn test_empty_corpus_joins_to_empty() {
        let corpus = Corpus::default();
        assert!(corpus.is_empty());
        assert_eq!(corpus.joined_content(), "");
    }

    #[test]
    fn test_source_count_deduplicates_chunks() {
        let corpus = Corpus::new(vec![
            Document::new("a.py", "1"),
            Document::new("a.py", "2"),
            Document::new("b.md", "3"),
        ]);
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.source_count(), 2);
    }

    #[test]
    fn test_markdown_section_for_success_and_failure() {
        let ok = TopicResult::completed("Memory usage", "Looks fine.");
        assert_eq!(ok.markdown_section(), "## Memory usage\nLooks fine.\n");

        let failed = TopicResult::failed("Bottlenecks", "timed out");
        assert!(failed.outcome.is_failed());
        assert_eq!(
            failed.markdown_section(),
            "## Bottlenecks\nError during analysis: timed out\n"
        );
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_string(&TopicOutcome::Failed("boom".to_string())).unwrap();
        assert_eq!(json, r#"{"status":"failed","text":"boom"}"#);
    }
}
