//! Git repository checkout.
//!
//! Repositories are shallow-cloned with git2 into a temporary directory
//! that is removed again once the review is finished.

use anyhow::{Context, Result};
use git2::{FetchOptions, Progress, RemoteCallbacks, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// A checked-out working tree.
#[derive(Debug)]
pub struct Checkout {
    path: PathBuf,
    /// Short hash of the checked-out HEAD commit.
    commit: Option<String>,
    /// Keeps a temporary checkout alive; `None` for persistent targets.
    temp_dir: Option<TempDir>,
    /// Whether this checkout was created by us and may be deleted.
    owned: bool,
}

impl Checkout {
    /// Path to the repository root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    pub fn is_temporary(&self) -> bool {
        self.temp_dir.is_some()
    }

    /// Remove the working tree from disk. Local directories that were only
    /// opened are left alone.
    pub fn cleanup(self) -> Result<()> {
        if !self.owned {
            debug!("Leaving local directory in place: {}", self.path.display());
            return Ok(());
        }
        match self.temp_dir {
            Some(temp_dir) => {
                let path = temp_dir.path().to_path_buf();
                temp_dir
                    .close()
                    .with_context(|| format!("Failed to remove checkout at {}", path.display()))?;
                info!("Removed checkout: {}", path.display());
            }
            None => {
                if self.path.exists() {
                    std::fs::remove_dir_all(&self.path)
                        .with_context(|| {
                            format!("Failed to remove checkout at {}", self.path.display())
                        })?;
                    info!("Removed checkout: {}", self.path.display());
                } else {
                    debug!("Checkout already gone: {}", self.path.display());
                }
            }
        }
        Ok(())
    }
}

/// Options for cloning a repository.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Branch to checkout (None for default branch).
    pub branch: Option<String>,
    /// Depth for shallow clone (None for full clone).
    pub depth: Option<i32>,
    /// Whether to show a progress bar.
    pub show_progress: bool,
    /// Target directory (None for temp directory). Replaced if it exists.
    pub target_dir: Option<PathBuf>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            branch: None,
            depth: Some(1),
            show_progress: false,
            target_dir: None,
        }
    }
}

/// Check that a URL looks like something git can clone remotely.
pub fn validate_repo_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("Repository URL is empty");
    }
    if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with("git@")) {
        anyhow::bail!("Repository URL must start with 'https://', 'http://' or 'git@': {}", url);
    }
    Ok(())
}

/// Clone a repository from a URL.
///
/// Blocking; async callers should run it on the blocking pool.
pub fn clone_repository(url: &str, options: CloneOptions) -> Result<Checkout> {
    validate_repo_url(url)?;
    info!("Cloning repository: {}", url);

    let (path, temp_dir) = match options.target_dir {
        Some(target) => {
            if target.exists() {
                info!("Removing existing directory: {}", target.display());
                std::fs::remove_dir_all(&target).with_context(|| {
                    format!("Failed to remove existing directory: {}", target.display())
                })?;
            }
            (target, None)
        }
        None => {
            let temp = TempDir::new().context("Failed to create temporary directory")?;
            let path = temp.path().to_path_buf();
            (path, Some(temp))
        }
    };

    debug!("Clone target: {}", path.display());

    let progress_bar = if options.show_progress {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-");
        Some(ProgressBar::new(0).with_style(style))
    } else {
        None
    };

    let mut callbacks = RemoteCallbacks::new();
    if let Some(pb) = progress_bar.clone() {
        callbacks.transfer_progress(move |progress: Progress<'_>| {
            pb.set_length(progress.total_objects() as u64);
            pb.set_position(progress.received_objects() as u64);
            true
        });
    }

    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(callbacks);
    if let Some(depth) = options.depth {
        fetch_opts.depth(depth);
    }

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_opts);
    if let Some(ref branch) = options.branch {
        builder.branch(branch);
    }

    let repo = builder
        .clone(url, &path)
        .with_context(|| format!("Failed to clone repository: {}", url))
        .inspect_err(|e| error!("Repository cloning failed: {:#}", e))?;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Clone complete");
    }

    let commit = head_commit(&repo);
    info!(
        "Cloned {} to {} ({})",
        url,
        path.display(),
        commit.as_deref().unwrap_or("unknown commit")
    );

    Ok(Checkout {
        path,
        commit,
        temp_dir,
        owned: true,
    })
}

/// Clone on the tokio blocking pool.
pub async fn clone_repository_async(url: String, options: CloneOptions) -> Result<Checkout> {
    tokio::task::spawn_blocking(move || clone_repository(&url, options))
        .await
        .context("Clone task panicked")?
}

/// Short hash of HEAD.
fn head_commit(repo: &Repository) -> Option<String> {
    repo.head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok())
        .map(|commit| commit.id().to_string().chars().take(8).collect())
}

/// Wrap an existing local directory as a checkout. It is never removed.
pub fn open_local(path: &Path) -> Result<Checkout> {
    if !path.is_dir() {
        anyhow::bail!("Repository path is not a directory: {}", path.display());
    }
    let commit = match Repository::open(path) {
        Ok(repo) => head_commit(&repo),
        Err(e) => {
            warn!("{} is not a git repository: {}", path.display(), e);
            None
        }
    };
    Ok(Checkout {
        path: path.to_path_buf(),
        commit,
        temp_dir: None,
        owned: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo_url() {
        assert!(validate_repo_url("https://github.com/rust-lang/rust").is_ok());
        assert!(validate_repo_url("git@github.com:rust-lang/rust.git").is_ok());
        assert!(validate_repo_url("http://localhost/repo.git").is_ok());
        assert!(validate_repo_url("").is_err());
        assert!(validate_repo_url("ftp://example.com/repo").is_err());
        assert!(validate_repo_url("not a url").is_err());
    }

    #[test]
    fn test_clone_options_default() {
        let opts = CloneOptions::default();
        assert!(opts.branch.is_none());
        assert_eq!(opts.depth, Some(1));
        assert!(!opts.show_progress);
        assert!(opts.target_dir.is_none());
    }

    #[test]
    fn test_invalid_url_fails_before_touching_disk() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("clone");
        let result = clone_repository(
            "invalid",
            CloneOptions {
                target_dir: Some(target.clone()),
                ..CloneOptions::default()
            },
        );
        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_cleanup_leaves_local_dir_in_place() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("work");
        std::fs::create_dir_all(target.join("src")).unwrap();
        std::fs::write(target.join("src/main.py"), "print(1)").unwrap();

        let checkout = open_local(&target).unwrap();
        assert!(!checkout.is_temporary());
        assert!(checkout.commit().is_none());

        checkout.cleanup().unwrap();
        assert!(target.join("src/main.py").exists());
    }

    #[test]
    fn test_cleanup_removes_owned_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("clone");
        std::fs::create_dir_all(&target).unwrap();
        let checkout = Checkout {
            path: target.clone(),
            commit: None,
            temp_dir: None,
            owned: true,
        };
        checkout.cleanup().unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_open_local_rejects_missing_dir() {
        assert!(open_local(Path::new("/definitely/not/here")).is_err());
    }
}
