//! Project loading: file discovery and chunking.
//!
//! This module walks a checkout, reads every text file that matches the
//! configured extensions and splits it into [`Document`] chunks.

pub mod splitter;

pub use splitter::DocumentSplitter;

use crate::models::{Corpus, Document};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for project loading.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include, without the dot.
    pub extensions: Vec<String>,
    /// Directory or file names to skip entirely.
    pub excludes: Vec<String>,
    /// File names that are never loaded.
    pub ignored_files: Vec<String>,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Maximum number of files to load.
    pub max_files: Option<usize>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&crate::config::ScannerConfig::default())
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            excludes: config.excludes.clone(),
            ignored_files: config.ignored_files.clone(),
            max_file_size: config.max_file_size,
            max_files: (config.max_files > 0).then_some(config.max_files),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// A file selected for loading.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Relative path from repo root, `/`-separated.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

/// Discovers and loads project files.
pub struct FileScanner {
    config: ScanConfig,
    repo_root: PathBuf,
}

impl FileScanner {
    pub fn new(repo_root: PathBuf, config: ScanConfig) -> Self {
        Self { config, repo_root }
    }

    /// Find all matching files, sorted by path.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.repo_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Cannot read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    debug!("Cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if size > self.config.max_file_size {
                debug!("Skipping large file {} ({} bytes)", entry.path().display(), size);
                continue;
            }

            files.push(ScannedFile {
                path: self.relative_path(entry.path()),
                size,
            });

            if let Some(max) = self.config.max_files {
                if files.len() >= max {
                    warn!("Reached file limit of {}, skipping the rest", max);
                    break;
                }
            }
        }

        Ok(files)
    }

    /// Read and split every matching file into a corpus.
    pub fn load(&self) -> Result<Corpus> {
        let splitter = DocumentSplitter::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let scanned = self.scan()?;
        let mut documents = Vec::new();
        debug!(
            "Splitting {} files, {} bytes (chunk size {}, overlap {})",
            scanned.len(),
            scanned.iter().map(|f| f.size).sum::<u64>(),
            splitter.chunk_size(),
            splitter.chunk_overlap()
        );

        for file in &scanned {
            let full_path = self.repo_root.join(&file.path);
            let content = match fs::read_to_string(&full_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Error loading {}: {}", file.path, e);
                    continue;
                }
            };

            documents.extend(
                splitter
                    .split(&content)
                    .into_iter()
                    .map(|chunk| Document::new(file.path.clone(), chunk)),
            );
        }

        info!(
            "Loaded {} chunks from {} files",
            documents.len(),
            scanned.len()
        );
        Ok(Corpus::new(documents))
    }

    /// Check if a file path matches the extension and name filters.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.config.ignored_files.iter().any(|ignored| ignored == name) {
            return false;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.config.extensions.contains(&ext)
    }

    /// Only names on the exclude list are skipped; dot-directories such as
    /// `.github` are walked like any other.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }

    fn relative_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.repo_root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "app/main.py", "def main():\n    return 1\n");
        write(root, "app/__init__.py", "");
        write(root, "README.md", "# Demo\n\nA demo project.\n");
        write(root, "pyproject.toml", "[project]\nname = \"demo\"\n");
        write(root, "config.YAML", "key: value\n");
        write(root, "src/lib.rs", "fn ignored() {}\n");
        write(root, ".git/config", "[core]\n");
        write(root, "__pycache__/main.txt", "cached");
        dir
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = fixture();
        let scanner = FileScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        let files: Vec<String> = scanner.scan().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(files, vec!["README.md", "app/main.py", "config.YAML"]);
    }

    #[test]
    fn test_dot_directories_are_walked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, ".github/workflows/ci.yml", "on: push\njobs: {}\n");
        write(root, ".pre-commit-config.yaml", "repos: []\n");
        write(root, ".venv/lib/site.py", "import os\n");
        write(root, "main.py", "print('hi')\n");

        let scanner = FileScanner::new(root.to_path_buf(), ScanConfig::default());
        let files: Vec<String> = scanner.scan().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(
            files,
            vec![".github/workflows/ci.yml", ".pre-commit-config.yaml", "main.py"]
        );
    }

    #[test]
    fn test_scan_reports_file_sizes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "0123456789");
        let files = FileScanner::new(dir.path().to_path_buf(), ScanConfig::default())
            .scan()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 10);
    }

    #[test]
    fn test_overlap_not_below_chunk_size_fails_load() {
        let dir = fixture();
        let config = ScanConfig {
            chunk_size: 100,
            chunk_overlap: 200,
            ..ScanConfig::default()
        };
        assert!(FileScanner::new(dir.path().to_path_buf(), config).load().is_err());
    }

    #[test]
    fn test_load_tags_chunks_with_source() {
        let dir = fixture();
        let scanner = FileScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        let corpus = scanner.load().unwrap();
        assert_eq!(corpus.source_count(), 3);
        let main = corpus
            .documents()
            .iter()
            .find(|d| d.source == "app/main.py")
            .unwrap();
        assert!(main.content.contains("def main()"));
    }

    #[test]
    fn test_large_files_split_into_bounded_chunks() {
        let dir = TempDir::new().unwrap();
        let body = (0..500)
            .map(|i| format!("value_{} = {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        write(dir.path(), "big.py", &body);

        let config = ScanConfig {
            chunk_size: 300,
            chunk_overlap: 30,
            ..ScanConfig::default()
        };
        let corpus = FileScanner::new(dir.path().to_path_buf(), config).load().unwrap();
        assert!(corpus.len() > 1);
        assert!(corpus
            .documents()
            .iter()
            .all(|d| d.source == "big.py" && d.content.chars().count() <= 300));
    }

    #[test]
    fn test_non_utf8_and_oversized_files_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("binary.txt"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        write(dir.path(), "huge.txt", &"x".repeat(2048));
        write(dir.path(), "ok.txt", "fine");

        let config = ScanConfig {
            max_file_size: 1024,
            ..ScanConfig::default()
        };
        let corpus = FileScanner::new(dir.path().to_path_buf(), config).load().unwrap();
        let sources: Vec<&str> = corpus.documents().iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["ok.txt"]);
    }

    #[test]
    fn test_max_files_limit() {
        let dir = fixture();
        let config = ScanConfig {
            max_files: Some(1),
            ..ScanConfig::default()
        };
        let files = FileScanner::new(dir.path().to_path_buf(), config).scan().unwrap();
        assert_eq!(files.len(), 1);
    }
}
