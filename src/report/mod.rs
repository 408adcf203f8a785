//! Report rendering and output.

pub mod generator;

pub use generator::{generate_json_report, render_html, write_report};
