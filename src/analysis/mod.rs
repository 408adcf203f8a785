//! Multi-topic repository analysis.
//!
//! Profiles name the topics, the prompt module builds the request text and
//! the dispatcher runs the requests against a completion backend.

pub mod dispatcher;
pub mod profiles;
pub mod prompt;

pub use dispatcher::{DispatchConfig, Dispatcher, DEFAULT_CONCURRENCY};
pub use profiles::AnalysisProfile;
