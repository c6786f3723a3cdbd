//! Decides which topic commit, if any, a hunk is fixing up.
//!
//! The engine is a pure function of the hunk, its blame, the topic-range
//! subjects and the strictness level, so it can be exercised entirely
//! with in-memory fixtures.

use std::fmt;

use crate::models::{Blame, CommitSubjects, DiffLine, Hunk};

/// How conservative hunk assignment is.
///
/// Levels are ordered from most to least permissive; comparisons on the
/// enum follow that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strictness {
    /// Assign on blame of the whole pre-image range, context included.
    /// Falls back to adjacency when the context is ambiguous.
    Context,
    /// Changed lines must be adjacent to lines blamed on exactly one
    /// topic commit, and no changed line may touch upstream.
    Adjacent,
    /// Insertions must additionally be surrounded by lines blamed on
    /// the same topic commit (one neighbor suffices at file boundaries).
    Surrounded,
}

impl Strictness {
    /// Map the numeric `--strict` level. Levels above 2 behave as the
    /// most conservative one.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Strictness::Context,
            1 => Strictness::Adjacent,
            _ => Strictness::Surrounded,
        }
    }
}

/// The engine's verdict for one hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The hunk fixes up this topic commit.
    Assigned(String),
    /// No single topic commit could be chosen.
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UpstreamBlamed,
    MultipleTargets,
    NoTargets,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UpstreamBlamed => write!(f, "changes lines blamed on upstream"),
            RejectReason::MultipleTargets => write!(f, "multiple fixup targets"),
            RejectReason::NoTargets => write!(f, "no fixup target"),
        }
    }
}

/// For each body line, the pre-image line number it corresponds to.
///
/// Added lines get the number of the pre-image line that would follow
/// the insertion; the line before the insertion point is at index - 1.
pub fn blame_indexes(hunk: &Hunk) -> Vec<u32> {
    let mut indexes = Vec::with_capacity(hunk.lines.len());
    let mut cursor = hunk.start;
    for line in &hunk.lines {
        indexes.push(cursor);
        if line.is_pre_image() {
            cursor += 1;
        }
    }
    indexes
}

/// Choose the topic commit a hunk is fixing up, or reject it.
pub fn assign(
    hunk: &Hunk,
    blame: &Blame,
    subjects: &CommitSubjects,
    strictness: Strictness,
) -> Outcome {
    let blamed = match strictness {
        Strictness::Context => {
            let mut shas: Vec<&str> = Vec::new();
            for line in blame.values() {
                if !shas.contains(&line.sha.as_str()) {
                    shas.push(&line.sha);
                }
            }
            let topic_count = shas
                .iter()
                .copied()
                .filter(|sha| subjects.contains_key(*sha))
                .count();
            if topic_count > 1 {
                // Ambiguous context; adjacency often narrows it to one
                // commit without raising strictness globally.
                changed_line_shas(hunk, blame, subjects, strictness)
            } else {
                shas
            }
        }
        Strictness::Adjacent | Strictness::Surrounded => {
            changed_line_shas(hunk, blame, subjects, strictness)
        }
    };
    decide(&blamed, subjects, strictness)
}

/// The shas implicated by the hunk's changed lines.
///
/// Deletions implicate the blame of the deleted line. An insertion run
/// implicates, at most once, the single topic commit its pre-image
/// neighbors point at; neighbors blamed outside the topic range are
/// recorded too, so strict modes can see that the insertion touches
/// upstream code. Context lines implicate nothing here.
fn changed_line_shas<'a>(
    hunk: &Hunk,
    blame: &'a Blame,
    subjects: &CommitSubjects,
    strictness: Strictness,
) -> Vec<&'a str> {
    let indexes = blame_indexes(hunk);
    let mut blamed: Vec<&'a str> = Vec::new();

    let mut di = 0;
    while di < hunk.lines.len() {
        let bi = indexes[di];
        match &hunk.lines[di] {
            DiffLine::Removed(_) => {
                if let Some(line) = blame.get(&bi) {
                    if !blamed.contains(&line.sha.as_str()) {
                        blamed.push(&line.sha);
                    }
                }
            }
            DiffLine::Added(_) => {
                let mut adjacent: Vec<&'a str> = Vec::new();
                if di > 0 {
                    if let Some(line) = bi.checked_sub(1).and_then(|prev| blame.get(&prev)) {
                        adjacent.push(&line.sha);
                    }
                }
                if let Some(line) = blame.get(&bi) {
                    if !adjacent.contains(&line.sha.as_str()) {
                        adjacent.push(&line.sha);
                    }
                }
                let targets: Vec<&'a str> = adjacent
                    .iter()
                    .copied()
                    .filter(|sha| subjects.contains_key(*sha))
                    .collect();
                let is_surrounded = !targets.is_empty()
                    && targets.len() == adjacent.len()
                    && targets.first() == targets.last();
                let is_adjacent = targets.len() == 1;
                if is_surrounded || (strictness < Strictness::Surrounded && is_adjacent) {
                    if !blamed.contains(&targets[0]) {
                        blamed.push(targets[0]);
                    }
                }
                for sha in adjacent {
                    if !subjects.contains_key(sha) && !blamed.contains(&sha) {
                        blamed.push(sha);
                    }
                }
                // One insertion run yields one decision.
                while di + 1 < hunk.lines.len()
                    && matches!(hunk.lines[di + 1], DiffLine::Added(_))
                {
                    di += 1;
                }
            }
            DiffLine::Context(_) | DiffLine::NoNewline(_) => {}
        }
        di += 1;
    }

    blamed
}

fn decide(blamed: &[&str], subjects: &CommitSubjects, strictness: Strictness) -> Outcome {
    let upstream_is_blamed = blamed.iter().any(|sha| !subjects.contains_key(*sha));
    let targets: Vec<&str> = blamed
        .iter()
        .copied()
        .filter(|sha| subjects.contains_key(*sha))
        .collect();

    if strictness > Strictness::Context && upstream_is_blamed {
        Outcome::Rejected(RejectReason::UpstreamBlamed)
    } else if targets.len() > 1 {
        Outcome::Rejected(RejectReason::MultipleTargets)
    } else if let Some(target) = targets.first() {
        Outcome::Assigned((*target).to_string())
    } else {
        Outcome::Rejected(RejectReason::NoTargets)
    }
}
