use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::models::CommitSubjects;

/// Errors from git operations
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("failed to execute git: {0}")]
    ExecutionFailed(#[from] std::io::Error),
    #[error("failed to parse git output: {0}")]
    ParseError(String),
    #[error("can't resolve revision: {0}")]
    BadRevision(String),
}

/// The git capabilities the tool needs. Keeping them behind a trait
/// isolates the one impure collaborator so everything above it can be
/// tested against in-memory fakes.
pub trait GitOps {
    /// Resolve a revision to a full commit id
    fn resolve_rev(&self, rev: &str) -> Result<String, GitError>;

    /// Top-level directory of the repository
    fn repo_root(&self) -> Result<PathBuf, GitError>;

    /// Subjects of the non-merge commits in `upstream..HEAD`, keyed by
    /// full commit id
    fn topic_commits(&self, upstream: &str) -> Result<CommitSubjects, GitError>;

    /// Unified diff of the index against HEAD with the given context
    /// count, ignoring submodules
    fn staged_diff(&self, context: u32) -> Result<String, GitError>;

    /// Porcelain-format blame of HEAD for `count` lines of `file`
    /// starting at `start`
    fn blame_range(&self, file: &str, start: u32, count: u32) -> Result<String, GitError>;

    /// Populate the given index file from HEAD's tree
    fn read_tree_into_index(&self, index: &Path) -> Result<(), GitError>;

    /// Apply a patch to the given index file only, accepting
    /// zero-context hunks
    fn apply_to_index(&self, index: &Path, patch: &str) -> Result<(), GitError>;

    /// Commit the given index file's content as `fixup! <target>`
    fn commit_fixup(&self, index: &Path, target: &str) -> Result<(), GitError>;
}

/// Real implementation of GitOps that calls git commands
pub struct Git {
    /// Working directory for git commands
    work_dir: Option<PathBuf>,
}

impl Git {
    pub fn new() -> Self {
        Self { work_dir: None }
    }

    pub fn with_work_dir(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: Some(work_dir.as_ref().to_path_buf()),
        }
    }

    /// Construct a Git rooted at the repository's top-level directory,
    /// so file paths from diff output resolve no matter where the tool
    /// was invoked from.
    pub fn with_repo_root() -> Result<Self, GitError> {
        let git = Self::new();
        let root = git.repo_root()?;
        Ok(Self::with_work_dir(root))
    }

    fn run_git(&self, args: &[&str]) -> Result<String, GitError> {
        self.run_git_with_index(None, args)
    }

    fn run_git_with_index(&self, index: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        if let Some(ref dir) = self.work_dir {
            cmd.current_dir(dir);
        }
        if let Some(index) = index {
            cmd.env("GIT_INDEX_FILE", index);
        }
        cmd.args(args);

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl GitOps for Git {
    fn resolve_rev(&self, rev: &str) -> Result<String, GitError> {
        let peeled = format!("{}^{{commit}}", rev);
        let output = self
            .run_git(&["rev-parse", "--quiet", "--verify", &peeled])
            .map_err(|_| GitError::BadRevision(rev.to_string()))?;
        Ok(output.trim().to_string())
    }

    fn repo_root(&self) -> Result<PathBuf, GitError> {
        let output = self.run_git(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(output.trim()))
    }

    fn topic_commits(&self, upstream: &str) -> Result<CommitSubjects, GitError> {
        let range = format!("{}..HEAD", upstream);
        let output = self.run_git(&["log", "--no-merges", "--format=%H:%s", &range])?;

        let mut subjects = CommitSubjects::new();
        for line in output.lines() {
            let (sha, subject) = line
                .split_once(':')
                .ok_or_else(|| GitError::ParseError(format!("bad log line: {}", line)))?;
            subjects.insert(sha.to_string(), subject.to_string());
        }
        Ok(subjects)
    }

    fn staged_diff(&self, context: u32) -> Result<String, GitError> {
        let context_arg = format!("-U{}", context);
        self.run_git(&[
            "diff",
            "--cached",
            "--no-color",
            "--ignore-submodules",
            &context_arg,
        ])
    }

    fn blame_range(&self, file: &str, start: u32, count: u32) -> Result<String, GitError> {
        let range = format!("{},+{}", start, count);
        self.run_git(&["blame", "--porcelain", "-L", &range, "HEAD", "--", file])
    }

    fn read_tree_into_index(&self, index: &Path) -> Result<(), GitError> {
        self.run_git_with_index(Some(index), &["read-tree", "HEAD"])?;
        Ok(())
    }

    fn apply_to_index(&self, index: &Path, patch: &str) -> Result<(), GitError> {
        let mut temp_file = tempfile::NamedTempFile::new()?;
        temp_file.write_all(patch.as_bytes())?;
        temp_file.flush()?;

        self.run_git_with_index(
            Some(index),
            &[
                "apply",
                "--cached",
                "--unidiff-zero",
                temp_file.path().to_str().unwrap(),
            ],
        )?;
        Ok(())
    }

    fn commit_fixup(&self, index: &Path, target: &str) -> Result<(), GitError> {
        let message = format!("fixup! {}", target);
        self.run_git_with_index(Some(index), &["commit", "-m", &message])?;
        Ok(())
    }
}
