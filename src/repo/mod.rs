//! Repository checkout.

pub mod cloner;

pub use cloner::{clone_repository_async, open_local, validate_repo_url, Checkout, CloneOptions};
