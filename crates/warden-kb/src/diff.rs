//! Line-oriented unified diff for write previews.
//!
//! Kept deliberately small: knowledge-base documents are short prose files,
//! so a quadratic longest-common-subsequence pass is plenty.

/// Context lines shown around each change.
const CONTEXT: usize = 3;

enum Edit<'a> {
    Equal(&'a str),
    Remove(&'a str),
    Add(&'a str),
}

/// Unified diff from `old` to `new` with `a/{path}` / `b/{path}` headers.
/// Empty when the texts have identical lines.
pub(crate) fn unified_diff(path: &str, old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let edits = edit_script(&old_lines, &new_lines);

    let change_idx: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| !matches!(e, Edit::Equal(_)))
        .map(|(i, _)| i)
        .collect();
    if change_idx.is_empty() {
        return String::new();
    }

    // Merge changes whose context windows touch into a single hunk.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for &c in &change_idx {
        let start = c.saturating_sub(CONTEXT);
        let end = (c + CONTEXT).min(edits.len() - 1);
        match hunks.last_mut() {
            Some((_, last_end)) if start <= *last_end + 1 => {
                *last_end = (*last_end).max(end);
            },
            _ => hunks.push((start, end)),
        }
    }

    let mut out = vec![format!("--- a/{path}"), format!("+++ b/{path}")];
    for (start, end) in hunks {
        let old_before = count_old(&edits[..start]);
        let new_before = count_new(&edits[..start]);
        let old_count = count_old(&edits[start..=end]);
        let new_count = count_new(&edits[start..=end]);
        let old_start = if old_count == 0 { old_before } else { old_before + 1 };
        let new_start = if new_count == 0 { new_before } else { new_before + 1 };
        out.push(format!(
            "@@ -{} +{} @@",
            range(old_start, old_count),
            range(new_start, new_count)
        ));
        for edit in &edits[start..=end] {
            out.push(match edit {
                Edit::Equal(line) => format!(" {line}"),
                Edit::Remove(line) => format!("-{line}"),
                Edit::Add(line) => format!("+{line}"),
            });
        }
    }
    out.join("\n")
}

fn range(start: usize, count: usize) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

fn count_old(edits: &[Edit<'_>]) -> usize {
    edits
        .iter()
        .filter(|e| matches!(e, Edit::Equal(_) | Edit::Remove(_)))
        .count()
}

fn count_new(edits: &[Edit<'_>]) -> usize {
    edits
        .iter()
        .filter(|e| matches!(e, Edit::Equal(_) | Edit::Add(_)))
        .count()
}

/// Edit script via longest common subsequence, removals before additions.
fn edit_script<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Edit<'a>> {
    let n = old.len();
    let m = new.len();
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            edits.push(Edit::Equal(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            edits.push(Edit::Remove(old[i]));
            i += 1;
        } else {
            edits.push(Edit::Add(new[j]));
            j += 1;
        }
    }
    edits.extend(old[i..].iter().map(|l| Edit::Remove(l)));
    edits.extend(new[j..].iter().map(|l| Edit::Add(l)));
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_diff_empty() {
        assert_eq!(unified_diff("kb.md", "a\nb\n", "a\nb\n"), "");
    }

    #[test]
    fn test_new_file_is_all_additions() {
        let diff = unified_diff("kb.md", "", "# KB\n\nfirst note\n");
        assert_eq!(
            diff,
            "--- a/kb.md\n+++ b/kb.md\n@@ -0,0 +1,3 @@\n+# KB\n+\n+first note"
        );
    }

    #[test]
    fn test_single_line_change_keeps_context() {
        let old = "one\ntwo\nthree\nfour\nfive\nsix\nseven\n";
        let new = "one\ntwo\nthree\nFOUR\nfive\nsix\nseven\n";
        let diff = unified_diff("notes.md", old, new);
        assert_eq!(
            diff,
            "--- a/notes.md\n+++ b/notes.md\n\
             @@ -1,7 +1,7 @@\n one\n two\n three\n-four\n+FOUR\n five\n six\n seven"
        );
    }

    #[test]
    fn test_distant_changes_get_separate_hunks() {
        let old: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let new = old.replace("line 2\n", "LINE 2\n").replace("line 19\n", "LINE 19\n");
        let diff = unified_diff("notes.md", &old, &new);
        assert_eq!(diff.matches("@@").count(), 4);
        assert!(diff.contains("-line 2\n+LINE 2"));
        assert!(diff.contains("-line 19\n+LINE 19"));
    }

    #[test]
    fn test_deletion_only() {
        let diff = unified_diff("kb.md", "keep\ndrop\n", "keep\n");
        assert_eq!(
            diff,
            "--- a/kb.md\n+++ b/kb.md\n@@ -1,2 +1 @@\n keep\n-drop"
        );
    }
}
