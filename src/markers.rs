//! Marker syntax carried inside snapshot text: the update marker and the
//! `<^regex$>` ignore regions.
//!
//! The scanner only ever compiles one fixed detection pattern; user patterns
//! inside the delimiters are compiled later, by the reconciler, against the
//! output span they are supposed to cover.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{format_error, to_error_source, too_many_regions, SeamError, Span};

/// Exact token that switches a comparison into update mode when it sits at
/// offset 0 of the expected text.
pub const UPDATE_MARKER: &str = "<!update>";

/// Hard cap on ignore regions processed per comparison. More than this in
/// one snapshot means the snapshot is pathological or the detection pattern
/// is malfunctioning, so the scanner refuses rather than mismatching.
pub const MAX_IGNORE_REGIONS: usize = 10;

/// Open-angle-caret, a shortest run of one-or-more non-newline characters,
/// dollar-close-angle. Non-greedy, so two markers on one line are found
/// separately.
static REGION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\^.+?\$>").expect("region marker pattern is fixed"));

/// A single `<^...$>` occurrence inside an expected text.
///
/// `span` covers the whole occurrence, delimiters included; `pattern`
/// borrows the interior only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreRegion<'a> {
    pub span: Span,
    pub pattern: &'a str,
}

/// Lazy left-to-right iterator over ignore-region occurrences. Each match
/// advances past the found span, so regions never overlap.
pub struct Regions<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Regions<'a> {
    type Item = IgnoreRegion<'a>;

    fn next(&mut self) -> Option<IgnoreRegion<'a>> {
        let found = REGION_MARKER.find_at(self.text, self.pos)?;
        self.pos = found.end();
        Some(IgnoreRegion {
            span: Span::new(found.start(), found.end()),
            pattern: &self.text[found.start() + 2..found.end() - 2],
        })
    }
}

/// Restartable occurrence iterator over `text`.
pub fn regions(text: &str) -> Regions<'_> {
    Regions { text, pos: 0 }
}

/// True when `text` contains at least one ignore-region occurrence.
pub fn has_regions(text: &str) -> bool {
    regions(text).next().is_some()
}

/// Collects all occurrences, enforcing [`MAX_IGNORE_REGIONS`].
pub fn scan(text: &str) -> Result<Vec<IgnoreRegion<'_>>, SeamError> {
    let mut found = Vec::new();
    for region in regions(text) {
        if found.len() == MAX_IGNORE_REGIONS {
            let src = to_error_source("snapshot", text);
            return Err(too_many_regions(MAX_IGNORE_REGIONS, &src, region.span));
        }
        found.push(region);
    }
    Ok(found)
}

/// Rejects an expected text that begins or ends with an ignore region.
///
/// An edge region would let the output drift without bound before or after
/// the snapshot, so comparison refuses it outright.
pub fn reject_edge_regions(text: &str, found: &[IgnoreRegion<'_>]) -> Result<(), SeamError> {
    if let Some(first) = found.first() {
        if first.span.start == 0 {
            let src = to_error_source("snapshot", text);
            return Err(format_error(
                "snapshot text begins with an ignore region",
                &src,
                first.span,
            ));
        }
    }
    if let Some(last) = found.last() {
        if last.span.end == text.len() {
            let src = to_error_source("snapshot", text);
            return Err(format_error(
                "snapshot text ends with an ignore region",
                &src,
                last.span,
            ));
        }
    }
    Ok(())
}

/// The text after the update marker when the marker sits at offset 0.
/// Anywhere else the marker is a likely typo and is left for the ordinary
/// diff to surface.
pub fn strip_update(text: &str) -> Option<&str> {
    text.strip_prefix(UPDATE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_regions_left_to_right() {
        let text = "id=<^[0-9]+$> name=<^\\w+$>!";
        let found = scan(text).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].pattern, "[0-9]+");
        assert_eq!(found[1].pattern, "\\w+");
        assert_eq!(&text[found[0].span.start..found[0].span.end], "<^[0-9]+$>");
    }

    #[test]
    fn test_scan_is_non_greedy_within_a_line() {
        let found = scan("a<^x$>b<^y$>c").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].pattern, "x");
        assert_eq!(found[1].pattern, "y");
    }

    #[test]
    fn test_marker_does_not_span_newlines() {
        assert!(!has_regions("a<^broken\nacross$>b"));
    }

    #[test]
    fn test_scan_accepts_exactly_the_cap() {
        let text: String = (0..MAX_IGNORE_REGIONS)
            .map(|i| format!("f{}=<^\\d$> ", i))
            .collect();
        assert_eq!(scan(&text).unwrap().len(), MAX_IGNORE_REGIONS);
    }

    #[test]
    fn test_scan_rejects_past_the_cap() {
        let text: String = (0..MAX_IGNORE_REGIONS + 1)
            .map(|i| format!("f{}=<^\\d$> ", i))
            .collect();
        let err = scan(&text).unwrap_err();
        assert!(matches!(err, SeamError::TooManyIgnoreRegions { .. }));
    }

    #[test]
    fn test_reject_edge_regions() {
        let leading = "<^\\d+$> tail";
        let err = reject_edge_regions(leading, &scan(leading).unwrap()).unwrap_err();
        assert!(matches!(err, SeamError::Format { .. }));

        let trailing = "head <^\\d+$>";
        let err = reject_edge_regions(trailing, &scan(trailing).unwrap()).unwrap_err();
        assert!(matches!(err, SeamError::Format { .. }));

        let interior = "head <^\\d+$> tail";
        assert!(reject_edge_regions(interior, &scan(interior).unwrap()).is_ok());
    }

    #[test]
    fn test_strip_update_requires_offset_zero() {
        assert_eq!(strip_update("<!update>rest"), Some("rest"));
        assert_eq!(strip_update(" <!update>rest"), None);
        assert_eq!(strip_update("no marker"), None);
    }
}
