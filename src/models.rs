use std::collections::{BTreeMap, HashMap};

/// A single body line in a unified-diff hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Unchanged context line
    Context(String),
    /// Line added in this change
    Added(String),
    /// Line removed in this change
    Removed(String),
    /// The `\ No newline at end of file` marker. Annotates the preceding
    /// line and does not count against the hunk's pre-image line count.
    /// Holds the whole marker line so it can be re-emitted verbatim.
    NoNewline(String),
}

impl DiffLine {
    /// Render the line with its diff prefix, exactly as it appeared
    /// in the original stream (without the trailing newline).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            DiffLine::Context(s) => format!(" {}", s),
            DiffLine::Added(s) => format!("+{}", s),
            DiffLine::Removed(s) => format!("-{}", s),
            DiffLine::NoNewline(s) => s.clone(),
        }
    }

    /// Whether this line occupies a line of the pre-image.
    #[must_use]
    pub fn is_pre_image(&self) -> bool {
        matches!(self, DiffLine::Context(_) | DiffLine::Removed(_))
    }
}

/// A contiguous change region parsed from a unified diff.
///
/// Line numbers are relative to the pre-image of the file, which for a
/// staged diff is the content at HEAD. The original hunk header is kept
/// verbatim so the hunk can be fed back to `git apply` unchanged.
#[derive(Debug, Clone)]
pub struct Hunk {
    /// File path with any `a/` or `b/` prefix stripped
    pub file: String,
    /// Starting line number in the pre-image (1-based)
    pub start: u32,
    /// Number of pre-image lines the hunk covers
    pub count: u32,
    /// The raw `@@ ... @@` header line
    pub header: String,
    /// The body lines, in stream order
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Convert this hunk to a patch suitable for `git apply`, with file
    /// headers and the original hunk header.
    #[must_use]
    pub fn to_patch(&self) -> String {
        let mut patch = String::new();
        patch.push_str(&format!("--- a/{}\n", self.file));
        patch.push_str(&format!("+++ b/{}\n", self.file));
        patch.push_str(&self.header);
        patch.push('\n');
        for line in &self.lines {
            patch.push_str(&line.render());
            patch.push('\n');
        }
        patch
    }
}

/// One line of blame output: the commit that last touched the line,
/// and the line's content at HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    pub sha: String,
    pub text: String,
}

/// Subjects of the non-merge commits in the topic range, keyed by full
/// 40-hex commit id. A commit is "topic" iff it appears here.
pub type CommitSubjects = HashMap<String, String>;

/// Rewrites fixup!/squash! commit ids to their canonical targets.
pub type AliasMap = HashMap<String, String>;

/// Per-line blame for one hunk's pre-image range, keyed by line number.
pub type Blame = BTreeMap<u32, BlameLine>;
