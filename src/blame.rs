use crate::git::{GitError, GitOps};
use crate::models::{AliasMap, Blame, BlameLine, Hunk};

/// Fetch blame for a hunk's pre-image range, with fixup/squash commit
/// ids rewritten to their canonical targets.
///
/// A hunk covering zero pre-image lines (a pure insertion produced with
/// zero context) has nothing to blame and yields an empty map.
pub fn for_hunk<G: GitOps>(git: &G, hunk: &Hunk, aliases: &AliasMap) -> Result<Blame, GitError> {
    if hunk.count == 0 {
        return Ok(Blame::new());
    }
    let output = git.blame_range(&hunk.file, hunk.start, hunk.count)?;
    Ok(parse_porcelain(&output, aliases))
}

/// Parse `git blame --porcelain` output.
///
/// Each line of the blamed range is introduced by a header of the form
/// `<40-hex> <origLine> <finalLine> [<groupSize>]` and carried by a
/// subsequent line starting with a tab; the ancillary headers in between
/// (author, committer, summary, ...) are ignored.
pub fn parse_porcelain(output: &str, aliases: &AliasMap) -> Blame {
    let mut blame = Blame::new();
    let mut current: Option<(String, u32)> = None;

    for line in output.lines() {
        if let Some(text) = line.strip_prefix('\t') {
            if let Some((sha, line_num)) = current.take() {
                blame.insert(
                    line_num,
                    BlameLine {
                        sha,
                        text: text.to_string(),
                    },
                );
            }
        } else if let Some((sha, line_num)) = parse_header(line) {
            let sha = aliases.get(&sha).cloned().unwrap_or(sha);
            current = Some((sha, line_num));
        }
    }

    blame
}

fn parse_header(line: &str) -> Option<(String, u32)> {
    let mut fields = line.split(' ');
    let hex = fields.next()?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let _orig_line: u32 = fields.next()?.parse().ok()?;
    let final_line: u32 = fields.next()?.parse().ok()?;
    Some((hex.to_string(), final_line))
}
