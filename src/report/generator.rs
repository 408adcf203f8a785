//! HTML report generation.
//!
//! Each topic result is rendered from Markdown to HTML and wrapped in its
//! own `<section>`, in report order.

use crate::models::{Report, ReportMetadata};
use anyhow::{Context, Result};
use pulldown_cmark::{html, Options, Parser};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

const STYLE: &str = r#"
        body {
            font-family: "Segoe UI", sans-serif;
            background-color: #FDFFCE;
            color: #333;
            line-height: 1.6;
            padding: 2rem;
            max-width: 960px;
            margin: auto;
        }
        h1, h2, h3 {
            color: #2c3e50;
        }
        pre {
            background-color: #404040;
            padding: 1em;
            overflow-x: auto;
            border-radius: 4px;
            border-left: 4px solid #2c3e50;
        }
        code {
            background-color: #404040;
            color: #fff;
            padding: 2px 4px;
            border-radius: 4px;
            font-family: "Courier New", monospace;
        }
        section {
            margin-bottom: 3rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid #ddd;
        }
        section.failed h2 {
            color: #c0392b;
        }
        header.metadata {
            font-size: 0.9rem;
            color: #555;
        }
"#;

/// Convert Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Escape text for use inside HTML element content or attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut escaped, text);
    escaped
}

/// Generate the metadata header.
fn generate_metadata_header(metadata: &ReportMetadata, failed: usize) -> String {
    let mut header = String::new();

    header.push_str("<header class=\"metadata\">\n<h1>Project Review Report</h1>\n<ul>\n");
    header.push_str(&format!(
        "<li><strong>Repository:</strong> {}</li>\n",
        escape_html(&metadata.repo_url)
    ));
    if let Some(ref commit) = metadata.commit {
        header.push_str(&format!(
            "<li><strong>Commit:</strong> <code>{}</code></li>\n",
            escape_html(commit)
        ));
    }
    header.push_str(&format!(
        "<li><strong>Analysis profile:</strong> {}</li>\n",
        escape_html(&metadata.profile)
    ));
    header.push_str(&format!(
        "<li><strong>Model:</strong> <code>{}</code></li>\n",
        escape_html(&metadata.model_used)
    ));
    header.push_str(&format!(
        "<li><strong>Generated:</strong> {}</li>\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    header.push_str(&format!(
        "<li><strong>Files loaded:</strong> {} ({} chunks)</li>\n",
        metadata.files_loaded, metadata.chunks_loaded
    ));
    if failed > 0 {
        header.push_str(&format!(
            "<li><strong>Failed topics:</strong> {}</li>\n",
            failed
        ));
    }
    header.push_str(&format!(
        "<li><strong>Duration:</strong> {:.1}s</li>\n",
        metadata.duration_seconds
    ));
    header.push_str("</ul>\n</header>\n");

    header
}

/// Render the complete HTML document.
pub fn render_html(report: &Report) -> String {
    let mut content = generate_metadata_header(&report.metadata, report.failed_count());

    for result in &report.results {
        let class = if result.outcome.is_failed() {
            " class=\"failed\""
        } else {
            ""
        };
        content.push_str(&format!(
            "<section{}>{}</section>\n",
            class,
            markdown_to_html(&result.markdown_section())
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>Project Review Report</title>\n    <style>{}    </style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, content
    )
}

/// Write the report atomically: readers see either the old or the new file.
pub fn write_report(html: &str, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(html.as_bytes())
        .context("Failed to write report contents")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!("[✓] Report saved to {}", path.display());
    Ok(())
}

/// Generate a JSON rendition of the report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
