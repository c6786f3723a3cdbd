use log::{debug, info, log_enabled, trace, Level};

use crate::attribution::{self, Outcome, Strictness};
use crate::blame;
use crate::committer::{self, FixupGroups};
use crate::diff_parser::parse_diff;
use crate::git::{GitError, GitOps};
use crate::report;
use crate::topic::{resolve_aliases, AliasError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Git(#[from] GitError),
    #[error(transparent)]
    Alias(#[from] AliasError),
    #[error("failed to create temporary index: {0}")]
    TempIndex(#[from] std::io::Error),
    #[error("{0}")]
    User(String),
}

pub struct Config {
    /// Upstream revision bounding the topic range; defaults to the
    /// upstream tracking ref
    pub revision: Option<String>,
    /// Diff context line count
    pub context: u32,
    pub strictness: Strictness,
}

pub struct App<G: GitOps> {
    git: G,
    config: Config,
}

impl<G: GitOps> App<G> {
    pub fn new(git: G, config: Config) -> Self {
        Self { git, config }
    }

    /// Attribute every staged hunk to a topic commit where possible and
    /// emit one fixup commit per attributed target.
    ///
    /// The user's own index is never touched: commits are built in a
    /// throwaway index file seeded from HEAD's tree. A failure after
    /// some fixup commits were created leaves those commits in place.
    pub fn run(&self) -> Result<(), AppError> {
        if self.config.strictness > Strictness::Context && self.config.context == 0 {
            return Err(AppError::User(
                "strict hunk assignment requires context lines; raise --context".to_string(),
            ));
        }

        let rev = self.config.revision.as_deref().unwrap_or("@{upstream}");
        let upstream = self.git.resolve_rev(rev)?;

        let diff = self.git.staged_diff(self.config.context)?;
        let hunks = parse_diff(&diff);
        if hunks.is_empty() {
            info!("no staged changes to absorb");
            return Ok(());
        }

        let subjects = self.git.topic_commits(&upstream)?;
        if subjects.is_empty() {
            info!("no commits in {}..HEAD to fix up", rev);
            return Ok(());
        }
        let aliases = resolve_aliases(&subjects)?;

        let mut groups = FixupGroups::new();
        let mut skipped = 0usize;
        for hunk in hunks {
            let blame = blame::for_hunk(&self.git, &hunk, &aliases)?;
            if log_enabled!(Level::Trace) {
                trace!(
                    "blame diff for {}:{}\n{}",
                    hunk.file,
                    hunk.start,
                    report::hunk_blamediff(&hunk, &blame, &subjects)
                );
            }
            let outcome = attribution::assign(&hunk, &blame, &subjects, self.config.strictness);
            debug!("{}", report::decision_line(&hunk, &outcome));
            match outcome {
                Outcome::Assigned(target) => groups.add(&target, hunk),
                Outcome::Rejected(_) => skipped += 1,
            }
        }

        if groups.is_empty() {
            info!("no staged hunk could be attributed to a topic commit");
            return Ok(());
        }

        // Scratch index under a temp dir removed on drop. The path must
        // not exist yet: git treats a missing index as empty but rejects
        // a zero-length index file.
        let scratch = tempfile::tempdir()?;
        let index = scratch.path().join("index");
        self.git.read_tree_into_index(&index)?;
        let created = committer::commit_fixups(&self.git, &index, &groups)?;

        info!(
            "created {} fixup commit{}",
            created,
            if created == 1 { "" } else { "s" }
        );
        if skipped > 0 {
            info!(
                "{} hunk{} left in the index unassigned",
                skipped,
                if skipped == 1 { "" } else { "s" }
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommitSubjects;
    use crate::test_utils::{sha_a, sha_b, sha_upstream};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    /// In-memory stand-in for the git subprocess layer.
    #[derive(Default)]
    struct FakeGit {
        diff: String,
        subjects: Vec<(String, String)>,
        /// (file, start, count) -> porcelain blame output
        blames: HashMap<(String, u32, u32), String>,
        commits: RefCell<Vec<String>>,
        applies: RefCell<Vec<String>>,
        tree_reads: RefCell<usize>,
    }

    impl GitOps for FakeGit {
        fn resolve_rev(&self, rev: &str) -> Result<String, GitError> {
            Ok(format!("resolved-{}", rev))
        }
        fn repo_root(&self) -> Result<PathBuf, GitError> {
            Ok(PathBuf::from("/repo"))
        }
        fn topic_commits(&self, _upstream: &str) -> Result<CommitSubjects, GitError> {
            Ok(self.subjects.iter().cloned().collect())
        }
        fn staged_diff(&self, _context: u32) -> Result<String, GitError> {
            Ok(self.diff.clone())
        }
        fn blame_range(&self, file: &str, start: u32, count: u32) -> Result<String, GitError> {
            self.blames
                .get(&(file.to_string(), start, count))
                .cloned()
                .ok_or_else(|| GitError::CommandFailed(format!("no blame for {}", file)))
        }
        fn read_tree_into_index(&self, _index: &Path) -> Result<(), GitError> {
            *self.tree_reads.borrow_mut() += 1;
            Ok(())
        }
        fn apply_to_index(&self, _index: &Path, patch: &str) -> Result<(), GitError> {
            self.applies.borrow_mut().push(patch.to_string());
            Ok(())
        }
        fn commit_fixup(&self, _index: &Path, target: &str) -> Result<(), GitError> {
            self.commits.borrow_mut().push(target.to_string());
            Ok(())
        }
    }

    fn porcelain(entries: &[(u32, &str, &str)]) -> String {
        let mut out = String::new();
        for (line, sha, text) in entries {
            out.push_str(&format!("{} {} {} 1\n\t{}\n", sha, line, line, text));
        }
        out
    }

    fn config(strictness: Strictness) -> Config {
        Config {
            revision: Some("upstream".to_string()),
            context: 3,
            strictness,
        }
    }

    #[test]
    fn test_run_creates_fixup_for_attributed_hunk() {
        let mut git = FakeGit {
            diff: "\
--- a/f.txt
+++ b/f.txt
@@ -1,3 +1,4 @@
 one
+added
 two
 three
"
            .to_string(),
            subjects: vec![(sha_a(), "change f".to_string())],
            ..FakeGit::default()
        };
        git.blames.insert(
            ("f.txt".to_string(), 1, 3),
            porcelain(&[(1, &sha_a(), "one"), (2, &sha_a(), "two"), (3, &sha_a(), "three")]),
        );

        let app = App::new(git, config(Strictness::Context));
        app.run().unwrap();

        assert_eq!(*app.git.tree_reads.borrow(), 1);
        assert_eq!(*app.git.commits.borrow(), vec![sha_a()]);
        let applies = app.git.applies.borrow();
        assert_eq!(applies.len(), 1);
        assert!(applies[0].starts_with("--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,4 @@\n"));
    }

    #[test]
    fn test_run_groups_hunks_by_target() {
        let mut git = FakeGit {
            diff: "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,3 @@
 one
+added
 two
@@ -10,2 +11,3 @@
 ten
+more
 eleven
--- a/g.txt
+++ b/g.txt
@@ -1,2 +1,3 @@
 uno
+nuevo
 dos
"
            .to_string(),
            subjects: vec![
                (sha_a(), "change f".to_string()),
                (sha_b(), "change g".to_string()),
            ],
            ..FakeGit::default()
        };
        git.blames.insert(
            ("f.txt".to_string(), 1, 2),
            porcelain(&[(1, &sha_a(), "one"), (2, &sha_a(), "two")]),
        );
        git.blames.insert(
            ("f.txt".to_string(), 10, 2),
            porcelain(&[(10, &sha_a(), "ten"), (11, &sha_a(), "eleven")]),
        );
        git.blames.insert(
            ("g.txt".to_string(), 1, 2),
            porcelain(&[(1, &sha_b(), "uno"), (2, &sha_b(), "dos")]),
        );

        let app = App::new(git, config(Strictness::Context));
        app.run().unwrap();

        assert_eq!(*app.git.commits.borrow(), vec![sha_a(), sha_b()]);
        let applies = app.git.applies.borrow();
        assert_eq!(applies.len(), 2);
        // both f.txt hunks land in one patch
        assert_eq!(applies[0].matches("--- a/f.txt").count(), 2);
    }

    #[test]
    fn test_run_skips_unattributable_hunks() {
        let mut git = FakeGit {
            diff: "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,2 @@
-one
+ONE
 two
"
            .to_string(),
            subjects: vec![(sha_a(), "change f".to_string())],
            ..FakeGit::default()
        };
        git.blames.insert(
            ("f.txt".to_string(), 1, 2),
            porcelain(&[(1, &sha_upstream(), "one"), (2, &sha_upstream(), "two")]),
        );

        let app = App::new(git, config(Strictness::Context));
        app.run().unwrap();

        assert!(app.git.commits.borrow().is_empty());
        assert_eq!(*app.git.tree_reads.borrow(), 0);
    }

    #[test]
    fn test_run_rewrites_aliases_through_blame() {
        // Blame reporting the fixup commit resolves to its target.
        let mut git = FakeGit {
            diff: "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,3 @@
 one
+added
 two
"
            .to_string(),
            subjects: vec![
                (sha_a(), "feat: foo".to_string()),
                (sha_b(), "fixup! feat: foo".to_string()),
            ],
            ..FakeGit::default()
        };
        git.blames.insert(
            ("f.txt".to_string(), 1, 2),
            porcelain(&[(1, &sha_b(), "one"), (2, &sha_b(), "two")]),
        );

        let app = App::new(git, config(Strictness::Context));
        app.run().unwrap();

        assert_eq!(*app.git.commits.borrow(), vec![sha_a()]);
    }

    #[test]
    fn test_run_rejects_strict_without_context() {
        let git = FakeGit::default();
        let app = App::new(
            git,
            Config {
                revision: None,
                context: 0,
                strictness: Strictness::Adjacent,
            },
        );
        assert!(matches!(app.run(), Err(AppError::User(_))));
    }

    #[test]
    fn test_run_with_no_staged_changes_is_a_noop() {
        let git = FakeGit::default();
        let app = App::new(git, config(Strictness::Context));
        app.run().unwrap();
        assert!(app.git.commits.borrow().is_empty());
    }

    #[test]
    fn test_run_propagates_alias_errors() {
        let mut git = FakeGit {
            diff: "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,3 @@
 one
+added
 two
"
            .to_string(),
            subjects: vec![(sha_a(), "fixup! nothing matches this".to_string())],
            ..FakeGit::default()
        };
        git.blames.insert(
            ("f.txt".to_string(), 1, 2),
            porcelain(&[(1, &sha_a(), "one"), (2, &sha_a(), "two")]),
        );

        let app = App::new(git, config(Strictness::Context));
        assert!(matches!(app.run(), Err(AppError::Alias(_))));
        assert!(app.git.commits.borrow().is_empty());
    }
}
