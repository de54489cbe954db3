//! Thin adapter over the `difference` crate.
//!
//! The rest of the engine only ever sees [`DiffOp`] sequences with a fixed
//! direction: expected is the delete side, got is the insert side. Two
//! properties of the adapter output are load-bearing for the reconciler's
//! byte walks and must hold for every op list produced here:
//!
//! 1. No op carries empty text.
//! 2. The texts partition both inputs exactly: concatenating Equal and
//!    Delete texts in order reproduces `expected`, and concatenating Equal
//!    and Insert texts in order reproduces `got`.

use difference::{Changeset, Difference};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Equal,
    Delete,
    Insert,
}

/// One chunk of the edit script transforming expected into got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    pub kind: DiffKind,
    pub text: String,
}

impl DiffOp {
    pub fn new(kind: DiffKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_equal(&self) -> bool {
        self.kind == DiffKind::Equal
    }
}

/// Computes a character-granular edit script from `expected` to `got`.
pub fn script(expected: &str, got: &str) -> Vec<DiffOp> {
    let changeset = Changeset::new(expected, got, "");
    changeset
        .diffs
        .into_iter()
        .filter_map(|diff| {
            let op = match diff {
                Difference::Same(text) => DiffOp::new(DiffKind::Equal, text),
                Difference::Rem(text) => DiffOp::new(DiffKind::Delete, text),
                Difference::Add(text) => DiffOp::new(DiffKind::Insert, text),
            };
            if op.text.is_empty() {
                None
            } else {
                Some(op)
            }
        })
        .collect()
}

/// Reconstructs the two input texts from an op list: `(expected, got)`.
pub fn sides(ops: &[DiffOp]) -> (String, String) {
    let mut expected = String::new();
    let mut got = String::new();
    for op in ops {
        match op.kind {
            DiffKind::Equal => {
                expected.push_str(&op.text);
                got.push_str(&op.text);
            }
            DiffKind::Delete => expected.push_str(&op.text),
            DiffKind::Insert => got.push_str(&op.text),
        }
    }
    (expected, got)
}

/// Longest Equal the fold pass may treat as noise. Equals above this length
/// are anchors: the reconciler maps ignore regions across them, and folding
/// one away can leave a region with nothing to bind to.
const MAX_FOLD_LEN: usize = 4;

/// Merges trivial fragment noise into meaningful chunks.
///
/// Two passes until stable:
/// 1. Canonical merge: adjacent same-kind ops coalesce, and every maximal run
///    of edits collapses to one Delete followed by one Insert.
/// 2. Fold: an Equal of at most [`MAX_FOLD_LEN`] bytes, no longer than the
///    larger side of the edit run before it nor of the run after it, is
///    split into a Delete/Insert pair carrying the same text, so the
///    surrounding edits join into one chunk on each side.
///
/// Per-side text order is preserved exactly, so the partition property above
/// survives cleanup.
pub fn cleanup_semantic(ops: &mut Vec<DiffOp>) {
    merge(ops);
    loop {
        let Some(at) = foldable_equal(ops) else {
            break;
        };
        let text = ops[at].text.clone();
        ops[at] = DiffOp::new(DiffKind::Delete, text.clone());
        ops.insert(at + 1, DiffOp::new(DiffKind::Insert, text));
        merge(ops);
    }
}

/// Canonical merge pass; also used by the reconciler after placeholder
/// substitution.
pub(crate) fn merge(ops: &mut Vec<DiffOp>) {
    let mut merged: Vec<DiffOp> = Vec::with_capacity(ops.len());
    let mut deletes = String::new();
    let mut inserts = String::new();
    for op in ops.drain(..) {
        if op.text.is_empty() {
            continue;
        }
        match op.kind {
            DiffKind::Delete => deletes.push_str(&op.text),
            DiffKind::Insert => inserts.push_str(&op.text),
            DiffKind::Equal => {
                flush_edits(&mut merged, &mut deletes, &mut inserts);
                if let Some(last) = merged.last_mut() {
                    if last.is_equal() {
                        last.text.push_str(&op.text);
                        continue;
                    }
                }
                merged.push(op);
            }
        }
    }
    flush_edits(&mut merged, &mut deletes, &mut inserts);
    *ops = merged;
}

fn flush_edits(merged: &mut Vec<DiffOp>, deletes: &mut String, inserts: &mut String) {
    if !deletes.is_empty() {
        merged.push(DiffOp::new(DiffKind::Delete, std::mem::take(deletes)));
    }
    if !inserts.is_empty() {
        merged.push(DiffOp::new(DiffKind::Insert, std::mem::take(inserts)));
    }
}

/// Finds the first Equal op short enough to fold into the edit runs on both
/// sides of it. Assumes canonical (merged) input, so neighbouring edit runs
/// are at most a Delete/Insert pair.
fn foldable_equal(ops: &[DiffOp]) -> Option<usize> {
    for (i, op) in ops.iter().enumerate() {
        if !op.is_equal() || i == 0 || i + 1 == ops.len() {
            continue;
        }
        let before = edit_run_mass(ops[..i].iter().rev());
        let after = edit_run_mass(ops[i + 1..].iter());
        let (Some(before), Some(after)) = (before, after) else {
            continue;
        };
        let len = op.text.len();
        if len <= MAX_FOLD_LEN && len <= before && len <= after {
            return Some(i);
        }
    }
    None
}

/// The larger side of a contiguous edit run, or None when the run is empty.
fn edit_run_mass<'a>(ops: impl Iterator<Item = &'a DiffOp>) -> Option<usize> {
    let mut deleted = 0usize;
    let mut inserted = 0usize;
    for op in ops {
        match op.kind {
            DiffKind::Equal => break,
            DiffKind::Delete => deleted += op.text.len(),
            DiffKind::Insert => inserted += op.text.len(),
        }
    }
    if deleted == 0 && inserted == 0 {
        None
    } else {
        Some(deleted.max(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition_holds(expected: &str, got: &str, ops: &[DiffOp]) {
        let (exp_side, got_side) = sides(ops);
        assert_eq!(exp_side, expected, "delete side must reproduce expected");
        assert_eq!(got_side, got, "insert side must reproduce got");
    }

    #[test]
    fn test_script_partitions_inputs() {
        let cases = [
            ("abc", "abc"),
            ("abc", "axc"),
            ("", "xyz"),
            ("xyz", ""),
            ("a<^[0-9]+$>b", "a123b"),
            ("one\ntwo", "one\nthree"),
        ];
        for (expected, got) in cases {
            let ops = script(expected, got);
            partition_holds(expected, got, &ops);
            assert!(ops.iter().all(|op| !op.text.is_empty()));
        }
    }

    #[test]
    fn test_identical_inputs_are_all_equal() {
        let ops = script("same text", "same text");
        assert!(ops.iter().all(DiffOp::is_equal));
    }

    #[test]
    fn test_merge_collapses_edit_runs() {
        let mut ops = vec![
            DiffOp::new(DiffKind::Insert, "x"),
            DiffOp::new(DiffKind::Delete, "a"),
            DiffOp::new(DiffKind::Insert, "y"),
            DiffOp::new(DiffKind::Delete, "b"),
            DiffOp::new(DiffKind::Equal, "tail"),
        ];
        merge(&mut ops);
        assert_eq!(
            ops,
            vec![
                DiffOp::new(DiffKind::Delete, "ab"),
                DiffOp::new(DiffKind::Insert, "xy"),
                DiffOp::new(DiffKind::Equal, "tail"),
            ]
        );
    }

    #[test]
    fn test_cleanup_folds_short_equal_between_edits() {
        // "The c|at in the h|at" style noise: a one-char Equal sandwiched
        // between one-char edits becomes part of a single replacement.
        let mut ops = vec![
            DiffOp::new(DiffKind::Equal, "The "),
            DiffOp::new(DiffKind::Delete, "c"),
            DiffOp::new(DiffKind::Insert, "b"),
            DiffOp::new(DiffKind::Equal, "a"),
            DiffOp::new(DiffKind::Delete, "t"),
            DiffOp::new(DiffKind::Insert, "d"),
            DiffOp::new(DiffKind::Equal, "!"),
        ];
        cleanup_semantic(&mut ops);
        assert_eq!(
            ops,
            vec![
                DiffOp::new(DiffKind::Equal, "The "),
                DiffOp::new(DiffKind::Delete, "cat"),
                DiffOp::new(DiffKind::Insert, "bad"),
                DiffOp::new(DiffKind::Equal, "!"),
            ]
        );
        partition_holds("The cat!", "The bad!", &ops);
    }

    #[test]
    fn test_cleanup_keeps_long_equal_runs() {
        let mut ops = vec![
            DiffOp::new(DiffKind::Delete, "x"),
            DiffOp::new(DiffKind::Equal, "a long stable middle"),
            DiffOp::new(DiffKind::Insert, "y"),
        ];
        cleanup_semantic(&mut ops);
        assert_eq!(ops.len(), 3);
        assert!(ops[1].is_equal());
    }

    #[test]
    fn test_cleanup_keeps_anchors_between_large_edits() {
        // Both neighbouring runs are heavier than the Equal, but it is above
        // the fold cap and must survive as a mapping anchor.
        let mut ops = vec![
            DiffOp::new(DiffKind::Delete, "<^\\d+$>"),
            DiffOp::new(DiffKind::Insert, "881"),
            DiffOp::new(DiffKind::Equal, " name="),
            DiffOp::new(DiffKind::Delete, "<^\\w+$>"),
            DiffOp::new(DiffKind::Insert, "renderer"),
        ];
        cleanup_semantic(&mut ops);
        assert!(ops.iter().any(|op| op.is_equal() && op.text == " name="));
    }

    #[test]
    fn test_cleanup_preserves_partition_on_scripts() {
        let expected = "status: waiting\nretries: 3\n";
        let got = "status: running\nretries: 4\n";
        let mut ops = script(expected, got);
        cleanup_semantic(&mut ops);
        partition_holds(expected, got, &ops);
    }
}
