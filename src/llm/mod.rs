//! Language-model completion backends.
//!
//! The dispatcher only needs "prompt in, text out", so backends are
//! abstracted behind [`CompletionBackend`].

pub mod client;

pub use client::{ChatClient, ClientConfig, Provider};

use std::future::Future;
use thiserror::Error;

/// Errors returned by a completion backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to model endpoint at {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Request(String),

    #[error("model API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse model response: {0}")]
    Decode(String),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// A backend that turns a prompt into generated text.
pub trait CompletionBackend: Send + Sync {
    /// Name of the model behind this backend.
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`.
    fn complete(&self, prompt: String) -> impl Future<Output = Result<String, LlmError>> + Send;
}
