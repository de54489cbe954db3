//! Reconciling a computed diff against the ignore regions embedded in the
//! expected text.
//!
//! The reconciler never touches the diff while measuring it. Every region is
//! first mapped to its byte range in the got text by walking the pristine op
//! list, and replacement decisions are collected as descriptors; the op list
//! is then rebuilt in a single pass. Replacing chunks as regions are visited
//! would skew the byte bookkeeping for every later region, because a
//! placeholder rarely has the same length as the chunks it stands in for.

use regex::Regex;

use crate::diagnostics::Span;
use crate::diff::{self, DiffKind, DiffOp};
use crate::markers::IgnoreRegion;

/// Outcome of reconciliation.
#[derive(Debug)]
pub struct Reconciled {
    /// The rebuilt op list, placeholders substituted.
    pub ops: Vec<DiffOp>,
    /// True iff any Delete or Insert survived.
    pub still_differs: bool,
    /// Locally-recovered region failures, for the report.
    pub notes: Vec<String>,
}

/// Which side of a region boundary an offset binds to when insertions sit
/// exactly at the seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    /// Bind before insertions: region starts exclude adjacent inserted text.
    Start,
    /// Bind after insertions: region ends absorb adjacent inserted text.
    End,
}

/// One region's replacement decision, collected against the pristine ops.
struct Replacement {
    expected: Span,
    got: Span,
    placeholder: DiffOp,
}

/// Maps one expected-space byte offset into got-space by walking `ops`.
///
/// Equal and Delete advance the expected cursor; Equal and Insert advance the
/// got cursor. An offset falling strictly inside an Equal chunk interpolates
/// (the bytes are identical on both sides there); inside a Delete it
/// collapses to the current got offset.
fn map_offset(ops: &[DiffOp], target: usize, bias: Bias) -> usize {
    let mut expected_at = 0usize;
    let mut got_at = 0usize;
    for op in ops {
        let len = op.text.len();
        match op.kind {
            DiffKind::Equal => {
                if target < expected_at + len || (bias == Bias::Start && target == expected_at) {
                    return got_at + (target - expected_at);
                }
                expected_at += len;
                got_at += len;
            }
            DiffKind::Delete => {
                if target < expected_at + len || (bias == Bias::Start && target == expected_at) {
                    return got_at;
                }
                expected_at += len;
            }
            DiffKind::Insert => {
                if bias == Bias::Start && target == expected_at {
                    return got_at;
                }
                got_at += len;
            }
        }
    }
    got_at
}

/// Maps a whole expected-space span to its got-space counterpart.
pub fn map_span(ops: &[DiffOp], span: Span) -> Span {
    Span::new(
        map_offset(ops, span.start, Bias::Start),
        map_offset(ops, span.end, Bias::End),
    )
}

/// Applies every region to the diff, neutralizing sanctioned differences and
/// forcing unsanctioned ones.
///
/// Per region: map its span into got-space, then
/// - skip it untouched when the got range carries the literal marker text
///   itself (the output merely mentions the marker);
/// - leave the diff untouched with a note when the range is empty (nothing
///   to anchor a placeholder to; the marker's delete chunks stay and keep
///   the mismatch) or spans a newline or the pattern fails to compile;
/// - otherwise replace every chunk contained in the region with a single
///   placeholder: Equal carrying the got range when the anchored pattern
///   matches it, Insert carrying it when not.
pub fn reconcile(
    ops: Vec<DiffOp>,
    found: &[IgnoreRegion<'_>],
    expected: &str,
    got: &str,
) -> Reconciled {
    let mut notes = Vec::new();
    let mut replacements: Vec<Replacement> = Vec::new();

    for region in found {
        let got_span = map_span(&ops, region.span);
        let marker_text = &expected[region.span.start..region.span.end];
        let window = &got[got_span.start..got_span.end];

        if window == marker_text {
            continue;
        }
        if window.is_empty() {
            notes.push(format!("ignore region `{}` matched no output", marker_text));
            continue;
        }
        if window.contains('\n') {
            notes.push(format!(
                "ignore region `{}` would span a line break in the output",
                marker_text
            ));
            replacements.push(Replacement {
                expected: region.span,
                got: got_span,
                placeholder: DiffOp::new(DiffKind::Insert, window),
            });
            continue;
        }

        let anchored = format!(r"\A(?:{})\z", region.pattern);
        let placeholder = match Regex::new(&anchored) {
            Ok(pattern) if pattern.is_match(window) => DiffOp::new(DiffKind::Equal, window),
            Ok(_) => DiffOp::new(DiffKind::Insert, window),
            Err(err) => {
                notes.push(format!(
                    "ignore pattern `{}` failed to compile: {}",
                    region.pattern,
                    first_line(&err.to_string())
                ));
                continue;
            }
        };
        replacements.push(Replacement {
            expected: region.span,
            got: got_span,
            placeholder,
        });
    }

    let mut ops = rebuild(ops, &replacements);
    diff::merge(&mut ops);
    let still_differs = ops.iter().any(|op| !op.is_equal());
    Reconciled {
        ops,
        still_differs,
        notes,
    }
}

/// Single-pass rebuild: chunks contained in a replacement's range collapse
/// into that replacement's placeholder, emitted once at the first such
/// chunk; everything else is copied through. Chunks straddling a region
/// boundary stay, since the text outside the region genuinely differs.
fn rebuild(ops: Vec<DiffOp>, replacements: &[Replacement]) -> Vec<DiffOp> {
    if replacements.is_empty() {
        return ops;
    }
    let mut out = Vec::with_capacity(ops.len());
    let mut emitted = vec![false; replacements.len()];
    let mut expected_at = 0usize;
    let mut got_at = 0usize;

    for op in ops {
        let len = op.text.len();
        let expected_range = Span::new(expected_at, expected_at + len);
        let got_range = Span::new(got_at, got_at + len);
        let contained = replacements.iter().position(|r| match op.kind {
            DiffKind::Delete => covers(r.expected, expected_range),
            DiffKind::Insert => covers(r.got, got_range),
            DiffKind::Equal => covers(r.expected, expected_range) || covers(r.got, got_range),
        });

        match op.kind {
            DiffKind::Equal => {
                expected_at += len;
                got_at += len;
            }
            DiffKind::Delete => expected_at += len,
            DiffKind::Insert => got_at += len,
        }

        match contained {
            Some(i) => {
                if !emitted[i] {
                    emitted[i] = true;
                    out.push(replacements[i].placeholder.clone());
                }
            }
            None => out.push(op),
        }
    }
    out
}

fn covers(outer: Span, inner: Span) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

/// Patch-mode body builder: rebuilds the got text with each region's
/// original marker text spliced in over the got range it maps to, so the
/// markers survive an update as live checks.
///
/// Got ranges are consumed monotonically; a range that collapsed behind the
/// cursor (possible when the diff gave a region nothing to anchor to) is
/// clamped and splices at the cursor instead.
pub fn splice(
    expected: &str,
    got: &str,
    found: &[IgnoreRegion<'_>],
    ops: &[DiffOp],
) -> String {
    let mut out = String::new();
    let mut cursor = 0usize;
    for region in found {
        let got_span = map_span(ops, region.span);
        let start = got_span.start.clamp(cursor, got.len());
        let end = got_span.end.clamp(start, got.len());
        out.push_str(&got[cursor..start]);
        out.push_str(&expected[region.span.start..region.span.end]);
        cursor = end;
    }
    out.push_str(&got[cursor..]);
    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
