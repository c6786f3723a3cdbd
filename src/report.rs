//! Human-readable rendering of attribution decisions.

use crate::attribution::{blame_indexes, Outcome};
use crate::models::{Blame, CommitSubjects, DiffLine, Hunk};

/// Truncate a sha to its first 8 characters for display
pub fn short_sha(sha: &str) -> &str {
    &sha[..8.min(sha.len())]
}

/// One-line summary of the engine's verdict for a hunk.
pub fn decision_line(hunk: &Hunk, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Assigned(sha) => {
            format!("fixup! {} {}:{}", short_sha(sha), hunk.file, hunk.start)
        }
        Outcome::Rejected(reason) => {
            format!("skipping hunk {}:{}: {}", hunk.file, hunk.start, reason)
        }
    }
}

/// Tabular blame-diff for a hunk: sha, pre-image line number, the line at
/// HEAD and the line in the working tree, side by side. Upstream shas
/// render as `^`; added lines have no pre-image columns; tabs render as
/// `^I` and trailing whitespace is stripped.
pub fn hunk_blamediff(hunk: &Hunk, blame: &Blame, subjects: &CommitSubjects) -> String {
    let indexes = blame_indexes(hunk);
    let mut out = String::new();

    for (di, line) in hunk.lines.iter().enumerate() {
        let bi = indexes[di];
        let entry = blame.get(&bi);

        let (sha_col, line_col) = if matches!(line, DiffLine::Added(_)) {
            (String::new(), String::new())
        } else {
            let sha = match entry {
                Some(b) if !subjects.contains_key(&b.sha) => "^".to_string(),
                Some(b) => b.sha.clone(),
                None => String::new(),
            };
            (sha, bi.to_string())
        };

        let head_text = match line {
            DiffLine::Context(_) | DiffLine::Removed(_) => {
                entry.map(|b| b.text.clone()).unwrap_or_default()
            }
            _ => String::new(),
        };
        let work_text = match line {
            DiffLine::Context(text) | DiffLine::Added(text) => text.clone(),
            _ => String::new(),
        };

        out.push_str(&format!(
            "{:<8.8}|{:>4.4}|{:<30.30}|{:<30.30}\n",
            sha_col,
            line_col,
            tidy(&head_text),
            tidy(&work_text),
        ));
    }
    out.push('\n');
    out
}

fn tidy(text: &str) -> String {
    text.replace('\t', "^I").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::RejectReason;
    use crate::test_utils::{make_blame, make_hunk, make_subjects, sha_a, sha_upstream};

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "01234567");
        assert_eq!(short_sha("short"), "short");
    }

    #[test]
    fn test_decision_lines() {
        let hunk = make_hunk("src/lib.rs", 7, "+x\n");
        assert_eq!(
            decision_line(&hunk, &Outcome::Assigned(sha_a())),
            format!("fixup! {} src/lib.rs:7", short_sha(&sha_a()))
        );
        assert_eq!(
            decision_line(&hunk, &Outcome::Rejected(RejectReason::NoTargets)),
            "skipping hunk src/lib.rs:7: no fixup target"
        );
    }

    #[test]
    fn test_blamediff_columns() {
        let subjects = make_subjects(&[(&sha_a(), "a")]);
        let blame = make_blame(&[(1, &sha_a(), "one\twide"), (2, &sha_upstream(), "two   ")]);
        let hunk = make_hunk("f.txt", 1, " one\twide\n-two   \n+TWO\n");
        let table = hunk_blamediff(&hunk, &blame, &subjects);
        let rows: Vec<&str> = table.lines().collect();

        // context line: topic sha, both sides, tab escaped
        assert!(rows[0].starts_with(short_sha(&sha_a())));
        assert!(rows[0].contains("one^Iwide"));
        // removed upstream line: caret sha, trailing whitespace stripped
        assert_eq!(rows[1], format!("^       |   2|{:<30}|{:<30}", "two", ""));
        // added line: blank sha and line number columns
        assert!(rows[2].starts_with("        |    |"));
        assert!(rows[2].contains("TWO"));
        // table ends with a separating blank line
        assert!(table.ends_with("\n\n"));
    }
}
