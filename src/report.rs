//! Mismatch reports: plain text for verdicts and panics, colorized for the
//! terminal.
//!
//! A report is assembled line-granular even though comparison is
//! char-granular: both sides are reconstructed from the reconciled ops and
//! re-diffed per line, which reads far better for multi-line snapshots.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diff::{self, DiffKind, DiffOp};
use crate::engine::{Snapshot, SourceLocation};

/// Terminal reporter for mismatches, updates, and warnings. All output goes
/// to stderr; color use is decided once, by the engine's configuration.
pub struct Reporter {
    use_colors: bool,
}

impl Reporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn stream(&self) -> StandardStream {
        let choice = if self.use_colors {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        StandardStream::stderr(choice)
    }

    /// Prints the colorized form of a mismatch report.
    pub fn print_mismatch(&self, snapshot: &Snapshot, ops: &[DiffOp], notes: &[String]) {
        let mut stderr = self.stream();

        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = writeln!(stderr, "snapshot mismatch at {}", snapshot.location);
        let _ = stderr.reset();

        for op in line_diff(ops) {
            let (color, prefix) = match op.kind {
                DiffKind::Equal => (None, ' '),
                DiffKind::Delete => (Some(Color::Red), '-'),
                DiffKind::Insert => (Some(Color::Green), '+'),
            };
            match color {
                Some(color) => {
                    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)));
                }
                None => {
                    let _ = stderr.reset();
                }
            }
            for line in chunk_lines(&op.text) {
                let _ = writeln!(stderr, "{}{}", prefix, line);
            }
        }
        let _ = stderr.reset();

        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        for note in notes {
            let _ = writeln!(stderr, "note: {}", note);
        }
        let _ = stderr.reset();
        let _ = writeln!(stderr, "{}", HINT);
    }

    /// Confirms a completed in-place rewrite.
    pub fn print_updated(&self, location: &SourceLocation) {
        let mut stderr = self.stream();
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = writeln!(stderr, "updated snapshot at {}", location);
        let _ = stderr.reset();
    }

    pub fn print_warning(&self, message: &str) {
        let mut stderr = self.stream();
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(stderr, "warning: {}", message);
        let _ = stderr.reset();
    }
}

const HINT: &str = "help: prefix the snapshot text with <!update> to accept the new output";

/// The uncolored report carried by a `Mismatch` verdict. Identical line
/// structure to the terminal form.
pub fn render(snapshot: &Snapshot, ops: &[DiffOp], notes: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("snapshot mismatch at {}\n", snapshot.location));
    for op in line_diff(ops) {
        let prefix = match op.kind {
            DiffKind::Equal => ' ',
            DiffKind::Delete => '-',
            DiffKind::Insert => '+',
        };
        for line in chunk_lines(&op.text) {
            out.push(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    for note in notes {
        out.push_str(&format!("note: {}\n", note));
    }
    out.push_str(HINT);
    out.push('\n');
    out
}

/// Re-diffs the two sides of an op list at line granularity.
fn line_diff(ops: &[DiffOp]) -> Vec<DiffOp> {
    let (expected_side, got_side) = diff::sides(ops);
    let changeset = Changeset::new(&expected_side, &got_side, "\n");
    changeset
        .diffs
        .into_iter()
        .map(|d| match d {
            Difference::Same(text) => DiffOp::new(DiffKind::Equal, text),
            Difference::Rem(text) => DiffOp::new(DiffKind::Delete, text),
            Difference::Add(text) => DiffOp::new(DiffKind::Insert, text),
        })
        .collect()
}

/// Lines of a newline-joined changeset chunk. A chunk holding one empty line
/// still yields it.
fn chunk_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
}
