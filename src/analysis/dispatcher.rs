//! Bounded-concurrency topic dispatch.
//!
//! One completion request is issued per topic of an [`AnalysisProfile`].
//! A semaphore caps how many requests are in flight; results come back in
//! profile order regardless of which request finishes first.

use super::profiles::AnalysisProfile;
use super::prompt::{build_prompt, truncate_chars, DEFAULT_CONTENT_BUDGET};
use crate::llm::CompletionBackend;
use crate::models::{Corpus, TopicResult};
use anyhow::{bail, Result};
use futures::future::join_all;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Default number of backend calls allowed in flight.
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Dispatcher settings.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Maximum in-flight backend calls.
    pub concurrency: usize,
    /// Maximum characters of corpus content placed in a prompt.
    pub content_budget: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            content_budget: DEFAULT_CONTENT_BUDGET,
        }
    }
}

/// Runs one analysis per topic against a completion backend.
pub struct Dispatcher<B> {
    backend: B,
    config: DispatchConfig,
    span: Span,
}

impl<B: CompletionBackend> Dispatcher<B> {
    /// Create a dispatcher. `span` parents every per-topic span.
    pub fn new(backend: B, config: DispatchConfig, span: Span) -> Result<Self> {
        if config.concurrency == 0 {
            bail!("Dispatch concurrency must be at least 1");
        }
        Ok(Self {
            backend,
            config,
            span,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Analyze `corpus` for every topic in `profile`.
    ///
    /// Never fails for an individual topic: a backend error becomes a
    /// failed [`TopicResult`] and the remaining topics proceed.
    pub async fn dispatch(&self, corpus: &Corpus, profile: AnalysisProfile) -> Vec<TopicResult> {
        let topics = profile.topics();
        if corpus.is_empty() {
            debug!("No project files loaded; topics are sent with empty content");
        }
        let joined = corpus.joined_content();
        let content = truncate_chars(&joined, self.config.content_budget);
        if content.len() < joined.len() {
            debug!(
                "Corpus truncated from {} to {} bytes",
                joined.len(),
                content.len()
            );
        }

        info!(
            "Dispatching {} topics for profile '{}' (concurrency {})",
            topics.len(),
            profile,
            self.config.concurrency
        );

        let permits = Semaphore::new(self.config.concurrency);
        let tasks = topics
            .iter()
            .map(|topic| self.analyze_topic(&permits, topic, content));

        join_all(tasks).await
    }

    async fn analyze_topic(&self, permits: &Semaphore, topic: &str, content: &str) -> TopicResult {
        let span = info_span!(parent: &self.span, "topic", topic = %topic);
        async {
            // The semaphore lives for this call and is never closed.
            let _permit = match permits.acquire().await {
                Ok(permit) => permit,
                Err(e) => return TopicResult::failed(topic, e.to_string()),
            };

            info!(" [-] Starting analysis: {}", topic);
            let started = Instant::now();
            let prompt = build_prompt(topic, content);

            let result = match self.backend.complete(prompt).await {
                Ok(text) => TopicResult::completed(topic, text),
                Err(e) => {
                    error!("Error during analysis of '{}': {}", topic, e);
                    TopicResult::failed(topic, e.to_string())
                }
            };

            info!(
                " [x] Finished analysis: {} ({:.1}s)",
                topic,
                started.elapsed().as_secs_f64()
            );
            result
        }
        .instrument(span)
        .await
    }
}
