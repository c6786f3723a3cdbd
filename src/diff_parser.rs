use crate::models::{DiffLine, Hunk};

/// Parse unified diff output into hunks.
///
/// Only three line shapes matter at the top level: `--- ` and `+++ ` set
/// the current file paths, and `@@ ` opens a hunk body. A hunk body runs
/// until the first line that doesn't start with ` `, `+`, `-` or `\`, or
/// that is itself a `--- `/`+++ ` file header; that line is re-examined
/// at the top level rather than consumed, since it may open the next
/// hunk or file.
///
/// Hunks whose pre- and post-image paths differ (creations, deletions,
/// renames) are discarded. Anything unrecognized is skipped; the diff
/// generator is trusted.
pub fn parse_diff(diff: &str) -> Vec<Hunk> {
    let lines: Vec<&str> = diff.lines().collect();
    let mut hunks = Vec::new();
    let mut pre_path: Option<&str> = None;
    let mut post_path: Option<&str> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(path) = line.strip_prefix("--- ") {
            pre_path = Some(strip_path_prefix(path));
            i += 1;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            post_path = Some(strip_path_prefix(path));
            i += 1;
        } else if line.starts_with("@@ ") {
            let header = line;
            i += 1;
            let body_start = i;
            while i < lines.len() && is_body_line(lines[i]) {
                i += 1;
            }
            if let (Some((start, count)), Some(pre), Some(post)) =
                (parse_hunk_header(header), pre_path, post_path)
            {
                if pre == post {
                    hunks.push(Hunk {
                        file: pre.to_string(),
                        start,
                        count,
                        header: header.to_string(),
                        lines: lines[body_start..i].iter().map(|l| parse_body_line(l)).collect(),
                    });
                }
            }
        } else {
            i += 1;
        }
    }

    hunks
}

fn strip_path_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

fn is_body_line(line: &str) -> bool {
    // A new file's `--- `/`+++ ` headers share a first byte with
    // removed/added lines but terminate the body.
    if line.starts_with("--- ") || line.starts_with("+++ ") {
        return false;
    }
    matches!(line.as_bytes().first(), Some(b' ' | b'+' | b'-' | b'\\'))
}

fn parse_body_line(line: &str) -> DiffLine {
    if let Some(content) = line.strip_prefix('+') {
        DiffLine::Added(content.to_string())
    } else if let Some(content) = line.strip_prefix('-') {
        DiffLine::Removed(content.to_string())
    } else if let Some(content) = line.strip_prefix(' ') {
        DiffLine::Context(content.to_string())
    } else {
        DiffLine::NoNewline(line.to_string())
    }
}

/// Parse the pre-image range out of a header like `@@ -1,5 +1,7 @@` or
/// `@@ -3 +3,2 @@ fn foo()`. The count defaults to 1 when omitted.
fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let range = line.strip_prefix("@@ -")?.split(' ').next()?;
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
