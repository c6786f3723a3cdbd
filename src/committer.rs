use std::path::Path;

use log::info;

use crate::git::{GitError, GitOps};
use crate::models::Hunk;
use crate::report::short_sha;

/// Hunks grouped by the commit they were attributed to.
///
/// Groups keep first-assignment order and each group keeps its hunks in
/// diff order, so emission is deterministic even though the downstream
/// rebase doesn't care.
#[derive(Debug, Default)]
pub struct FixupGroups {
    groups: Vec<(String, Vec<Hunk>)>,
}

impl FixupGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: &str, hunk: Hunk) {
        match self.groups.iter_mut().find(|(sha, _)| sha == target) {
            Some((_, hunks)) => hunks.push(hunk),
            None => self.groups.push((target.to_string(), vec![hunk])),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Hunk])> {
        self.groups
            .iter()
            .map(|(sha, hunks)| (sha.as_str(), hunks.as_slice()))
    }
}

/// Stage each group's hunks into the given index file and commit them as
/// a fixup of the group's target. Returns the number of commits created.
pub fn commit_fixups<G: GitOps>(
    git: &G,
    index: &Path,
    groups: &FixupGroups,
) -> Result<usize, GitError> {
    for (target, hunks) in groups.iter() {
        let mut patch = String::new();
        for hunk in hunks {
            patch.push_str(&hunk.to_patch());
        }
        git.apply_to_index(index, &patch)?;
        git.commit_fixup(index, target)?;
        info!("committed fixup! {}", short_sha(target));
    }
    Ok(groups.len())
}
