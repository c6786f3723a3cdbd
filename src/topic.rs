use crate::models::{AliasMap, CommitSubjects};

/// Errors from resolving fixup!/squash! subjects to their targets.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("fixup commits of fixup commits aren't supported: {subject:?}")]
    Nested { subject: String },
    #[error("no fixup target found for commit {sha}: {subject:?}")]
    NoTarget { sha: String, subject: String },
    #[error("ambiguous fixup target for commit {sha}: {subject:?}")]
    AmbiguousTarget { sha: String, subject: String },
}

/// The subject with its leading `fixup! ` or `squash! ` token removed,
/// or None for ordinary subjects.
pub fn fixup_prefix(subject: &str) -> Option<&str> {
    subject
        .strip_prefix("fixup! ")
        .or_else(|| subject.strip_prefix("squash! "))
}

/// Map each fixup!/squash! commit in the topic range to the commit it
/// marks, by matching the remainder of its subject against the other
/// subjects in the range.
///
/// Aliases are not collapsed transitively: a subject carrying two
/// fixup!/squash! tokens is rejected outright, so no alias can point at
/// another alias and applying the map twice equals applying it once.
pub fn resolve_aliases(subjects: &CommitSubjects) -> Result<AliasMap, AliasError> {
    let mut aliases = AliasMap::new();
    for (sha, subject) in subjects {
        let Some(prefix) = fixup_prefix(subject) else {
            continue;
        };
        if fixup_prefix(prefix).is_some() {
            return Err(AliasError::Nested {
                subject: subject.clone(),
            });
        }
        let matches: Vec<&String> = subjects
            .iter()
            .filter(|(other, other_subject)| {
                other.as_str() != sha.as_str() && other_subject.starts_with(prefix)
            })
            .map(|(other, _)| other)
            .collect();
        match matches.as_slice() {
            [] => {
                return Err(AliasError::NoTarget {
                    sha: sha.clone(),
                    subject: subject.clone(),
                })
            }
            [target] => {
                aliases.insert(sha.clone(), (*target).clone());
            }
            _ => {
                return Err(AliasError::AmbiguousTarget {
                    sha: sha.clone(),
                    subject: subject.clone(),
                })
            }
        }
    }
    Ok(aliases)
}
