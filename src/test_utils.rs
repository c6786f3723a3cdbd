//! Shared test fixtures.

use crate::models::{Blame, BlameLine, CommitSubjects, DiffLine, Hunk};

/// A 40-hex id standing in for one topic commit
pub fn sha_a() -> String {
    "a".repeat(40)
}

/// A 40-hex id standing in for another topic commit
pub fn sha_b() -> String {
    "b".repeat(40)
}

/// A 40-hex id standing in for a commit outside the topic range
pub fn sha_upstream() -> String {
    "0123456789".repeat(4)
}

/// Build a hunk from a raw diff body. Each body line must carry its
/// prefix byte; the pre-image count and a plausible header are derived.
pub fn make_hunk(file: &str, start: u32, body: &str) -> Hunk {
    let lines: Vec<DiffLine> = body
        .lines()
        .map(|line| {
            if let Some(content) = line.strip_prefix('+') {
                DiffLine::Added(content.to_string())
            } else if let Some(content) = line.strip_prefix('-') {
                DiffLine::Removed(content.to_string())
            } else if let Some(content) = line.strip_prefix(' ') {
                DiffLine::Context(content.to_string())
            } else {
                DiffLine::NoNewline(line.to_string())
            }
        })
        .collect();
    let count = lines.iter().filter(|l| l.is_pre_image()).count() as u32;
    let post_count = lines
        .iter()
        .filter(|l| matches!(l, DiffLine::Context(_) | DiffLine::Added(_)))
        .count() as u32;
    Hunk {
        file: file.to_string(),
        start,
        count,
        header: format!("@@ -{},{} +{},{} @@", start, count, start, post_count),
        lines,
    }
}

/// Build a blame map from `(line, sha, text)` triples
pub fn make_blame(entries: &[(u32, &str, &str)]) -> Blame {
    entries
        .iter()
        .map(|(line, sha, text)| {
            (
                *line,
                BlameLine {
                    sha: (*sha).to_string(),
                    text: (*text).to_string(),
                },
            )
        })
        .collect()
}

/// Build a subject map from `(sha, subject)` pairs
pub fn make_subjects(entries: &[(&str, &str)]) -> CommitSubjects {
    entries
        .iter()
        .map(|(sha, subject)| ((*sha).to_string(), (*subject).to_string()))
        .collect()
}
