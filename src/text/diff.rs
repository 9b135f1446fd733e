//! Unified-diff rendering between two texts.

use super::matcher::{Opcode, SequenceMatcher, Tag};

/// Lines of context around each change hunk.
const CONTEXT_LINES: usize = 3;

/// Renders a unified diff between `a` and `b`.
///
/// Output carries `---`/`+++` file headers and `@@` hunk headers with
/// 3 lines of context. Identical inputs produce an empty string (no
/// headers, no hunks).
///
/// # Example
///
/// ```rust
/// use snipstash::text::unified_diff;
///
/// let diff = unified_diff("a\nb\n", "a\nc\n", "before", "after");
/// assert!(diff.contains("-b"));
/// assert!(diff.contains("+c"));
/// ```
#[must_use]
pub fn unified_diff(a: &str, b: &str, from_label: &str, to_label: &str) -> String {
    let a_lines: Vec<&str> = a.lines().collect();
    let b_lines: Vec<&str> = b.lines().collect();
    let matcher = SequenceMatcher::new(&a_lines, &b_lines);

    let groups = grouped_opcodes(&matcher.opcodes(), CONTEXT_LINES);
    if groups.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {from_label}\n"));
    out.push_str(&format!("+++ {to_label}\n"));

    for group in &groups {
        let first = group[0];
        let last = group[group.len() - 1];
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(first.a_start, last.a_end),
            format_range(first.b_start, last.b_end),
        ));

        for op in group {
            match op.tag {
                Tag::Equal => {
                    for line in &a_lines[op.a_start..op.a_end] {
                        out.push_str(&format!(" {line}\n"));
                    }
                },
                Tag::Replace | Tag::Delete => {
                    for line in &a_lines[op.a_start..op.a_end] {
                        out.push_str(&format!("-{line}\n"));
                    }
                },
                Tag::Insert => {},
            }
            match op.tag {
                Tag::Replace | Tag::Insert => {
                    for line in &b_lines[op.b_start..op.b_end] {
                        out.push_str(&format!("+{line}\n"));
                    }
                },
                Tag::Equal | Tag::Delete => {},
            }
        }
    }
    out
}

/// Formats a hunk range in unified-diff convention.
///
/// Ranges are 1-based; a length of 1 is written as the bare start line,
/// and an empty range points just before its start.
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    if length == 1 {
        return (start + 1).to_string();
    }
    let beginning = if length == 0 { start } else { start + 1 };
    format!("{beginning},{length}")
}

/// Splits an edit script into hunk groups with `n` lines of context.
///
/// Long equal stretches are trimmed to `n` lines on each side and split
/// into separate groups. A script with no changes yields no groups.
fn grouped_opcodes(opcodes: &[Opcode], n: usize) -> Vec<Vec<Opcode>> {
    let mut codes: Vec<Opcode> = opcodes.to_vec();
    if codes.iter().all(|op| op.tag == Tag::Equal) {
        return Vec::new();
    }

    // Trim leading and trailing context down to n lines.
    if let Some(first) = codes.first_mut() {
        if first.tag == Tag::Equal {
            first.a_start = first.a_end.saturating_sub(n).max(first.a_start);
            first.b_start = first.b_end.saturating_sub(n).max(first.b_start);
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == Tag::Equal {
            last.a_end = last.a_end.min(last.a_start + n);
            last.b_end = last.b_end.min(last.b_start + n);
        }
    }

    let mut groups: Vec<Vec<Opcode>> = Vec::new();
    let mut group: Vec<Opcode> = Vec::new();
    for op in codes {
        // An equal run longer than 2n splits the surrounding changes
        // into separate hunks.
        if op.tag == Tag::Equal && op.a_end - op.a_start > 2 * n {
            group.push(Opcode {
                tag: Tag::Equal,
                a_start: op.a_start,
                a_end: op.a_end.min(op.a_start + n),
                b_start: op.b_start,
                b_end: op.b_end.min(op.b_start + n),
            });
            groups.push(group);
            group = vec![Opcode {
                tag: Tag::Equal,
                a_start: op.a_start.max(op.a_end.saturating_sub(n)),
                a_end: op.a_end,
                b_start: op.b_start.max(op.b_end.saturating_sub(n)),
                b_end: op.b_end,
            }];
        } else {
            group.push(op);
        }
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }
    groups
}
