//! Locating and re-emitting snapshot literal blocks inside source text.
//!
//! A snapshot literal is a run of contiguous lines that each consist of
//! optional leading spaces followed by the two-character block marker `\\`.
//! The block starts on the line after the snapshot call and ends at the first
//! line that fails the marker test (or at end of file).
//!
//! The locator works from a 0-based call line and byte offsets only; it never
//! parses the surrounding language. A file that no longer matches this shape
//! was edited since the snapshot was written, and the engine refuses to guess
//! what the programmer meant.

use crate::diagnostics::{format_error, to_error_source, SeamError, Span};

/// The two-character marker opening every literal-block line.
pub const BLOCK_MARKER: &str = "\\\\";

/// Fixed substring expected somewhere on the call line.
pub const CALL_MARKER: &str = "snapshot";

/// A located literal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// Byte range of the contiguous literal lines, including each line's
    /// trailing newline where present.
    pub span: Span,
    /// Whether the call line contained [`CALL_MARKER`]. Absence is a soft
    /// warning surfaced by the caller; the call may wrap across lines.
    pub call_marker_seen: bool,
}

/// Finds the literal block that follows `call_line` (0-based) in `source`.
///
/// `origin` names the source in diagnostics, typically the file path.
pub fn locate(source: &str, origin: &str, call_line: usize) -> Result<Located, SeamError> {
    let lines = line_table(source);

    let Some(&(_, call_text)) = lines.get(call_line) else {
        let src = to_error_source(origin, source);
        let end = source.len();
        return Err(format_error(
            format!("call line {} is past the end of the file", call_line + 1),
            &src,
            Span::new(end.saturating_sub(1), end),
        ));
    };
    let call_marker_seen = call_text.contains(CALL_MARKER);

    let Some(&(start, first)) = lines.get(call_line + 1) else {
        let src = to_error_source(origin, source);
        let end = source.len();
        return Err(format_error(
            format!("no literal block after call line {}", call_line + 1),
            &src,
            Span::new(end.saturating_sub(1), end),
        ));
    };
    if !is_block_line(first) {
        let src = to_error_source(origin, source);
        return Err(format_error(
            format!(
                "line {} is not a literal block line (expected leading spaces then `{}`)",
                call_line + 2,
                BLOCK_MARKER
            ),
            &src,
            Span::new(start, start + first.trim_end_matches('\n').len().max(1)),
        ));
    }

    let mut end = start + first.len();
    for &(offset, line) in &lines[call_line + 2..] {
        if !is_block_line(line) {
            break;
        }
        end = offset + line.len();
    }

    Ok(Located {
        span: Span::new(start, end),
        call_marker_seen,
    })
}

/// Strips indentation and block markers from a text, yielding the logical
/// snapshot body. Lines failing the block-line test contribute nothing, so
/// this accepts both a located block slice and a raw multi-line literal whose
/// first and last lines are quote furniture.
pub fn body(text: &str) -> String {
    let mut out = String::new();
    let mut first = true;
    for line in text.split('\n') {
        if !is_block_line(line) {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;
        let trimmed = line.trim_start_matches(' ');
        out.push_str(trimmed[BLOCK_MARKER.len()..].trim_end_matches('\n'));
    }
    out
}

/// Renders a logical snapshot body as indented block-marker lines, one per
/// body line, each terminated by a newline.
pub fn emit(body: &str, indent: &str) -> String {
    let mut out = String::new();
    for line in body.split('\n') {
        out.push_str(indent);
        out.push_str(BLOCK_MARKER);
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A block line is spaces, then exactly the two-backslash marker. One
/// backslash is not a block line, and neither is a tab-indented one.
fn is_block_line(line: &str) -> bool {
    line.trim_start_matches(' ').starts_with(BLOCK_MARKER)
}

/// Byte offset and text (newline included) of every line in `source`.
fn line_table(source: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }
    lines
}
