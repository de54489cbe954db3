//! The comparison engine: renders a value, dispatches on the update marker,
//! and turns the diff machinery into a single verdict per snapshot.
//!
//! `compare` is the whole pipeline. Expected text with a leading
//! [`markers::UPDATE_MARKER`] goes down the update path and rewrites the
//! source file; everything else is compared in memory and never touches
//! the filesystem.

use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::SeamError;
use crate::diff;
use crate::markers;
use crate::reconcile;
use crate::render::{RenderOptions, Renderable};
use crate::report::{self, Reporter};
use crate::update;

/// Largest file the updater will rewrite, in bytes.
pub const MAX_SOURCE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Knobs for a comparison run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Print mismatches but report them as passing. The update marker is
    /// still honored; preview softens verdicts, not explicit requests.
    pub preview: bool,
    /// Colorize diagnostic output.
    pub use_colors: bool,
    /// Ceiling for [`update::rewrite`]; files over this are refused.
    pub max_source_bytes: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview: false,
            use_colors: atty::is(atty::Stream::Stderr),
            max_source_bytes: MAX_SOURCE_BYTES,
        }
    }
}

// ============================================================================
// SNAPSHOT IDENTITY
// ============================================================================

/// Where a snapshot's call line sits on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// Zero-based line of the call; displayed one-based.
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line + 1)
    }
}

/// One snapshot assertion: the expected text and where it came from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub location: SourceLocation,
    /// Body text recovered from the literal block, markers included.
    pub expected: String,
    pub options: RenderOptions,
}

impl Snapshot {
    pub fn new(file: PathBuf, line: usize, expected: String) -> Self {
        Self {
            location: SourceLocation { file, line },
            expected,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Builds a [`Snapshot`] from the enclosing file and line plus a literal
/// carrying the block text. The literal is run through [`crate::block::body`],
/// so it may be written exactly as the block appears in the source.
#[macro_export]
macro_rules! snapshot {
    ($expected:expr $(,)?) => {
        $crate::Snapshot::new(
            ::std::path::PathBuf::from(file!()),
            (line!() as usize).saturating_sub(1),
            $crate::block::body($expected),
        )
    };
}

// ============================================================================
// VERDICTS
// ============================================================================

/// Outcome of one comparison.
#[derive(Debug)]
pub enum Verdict {
    /// Output agreed with the snapshot.
    Match,
    /// Output disagreed; `report` is the full uncolored mismatch text.
    Mismatch { report: String },
    /// The source file was rewritten. Deliberately not a pass: the run that
    /// writes a snapshot never vouches for it.
    Updated { file_text: String },
}

// ============================================================================
// ENGINE
// ============================================================================

/// Stateless comparison driver; holds only configuration.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Renders `value` and compares it against the snapshot, or rewrites the
    /// snapshot when the expected text opens with the update marker.
    ///
    /// The bound is `?Sized` so plain `&str` output and `&dyn Renderable`
    /// trait objects both pass through unchanged.
    pub fn compare<V: Renderable + ?Sized>(
        &self,
        snapshot: &Snapshot,
        value: &V,
    ) -> Result<Verdict, SeamError> {
        let got = value.render(&snapshot.options)?;
        match markers::strip_update(&snapshot.expected) {
            Some(rest) => self.run_update(snapshot, rest, &got),
            None => self.run_compare(snapshot, &got),
        }
    }

    /// Like [`Engine::compare`], but panics on anything other than a match.
    /// This is the call to put at the end of a test.
    pub fn check<V: Renderable + ?Sized>(&self, snapshot: &Snapshot, value: &V) {
        match self.compare(snapshot, value) {
            Ok(Verdict::Match) => {}
            Ok(Verdict::Mismatch { report }) => panic!("{}", report),
            Ok(Verdict::Updated { .. }) => panic!(
                "snapshot updated at {}; re-run without the update marker",
                snapshot.location
            ),
            Err(e) => panic!("snapshot comparison failed at {}: {}", snapshot.location, e),
        }
    }

    // =====================
    // Compare path
    // =====================

    fn run_compare(&self, snapshot: &Snapshot, got: &str) -> Result<Verdict, SeamError> {
        let expected = &snapshot.expected;
        let found = markers::scan(expected)?;
        markers::reject_edge_regions(expected, &found)?;

        let mut ops = diff::script(expected, got);
        if ops.iter().all(|op| op.is_equal()) {
            return Ok(Verdict::Match);
        }
        diff::cleanup_semantic(&mut ops);

        let (ops, notes) = if found.is_empty() {
            (ops, Vec::new())
        } else {
            let reconciled = reconcile::reconcile(ops, &found, expected, got);
            if !reconciled.still_differs {
                return Ok(Verdict::Match);
            }
            (reconciled.ops, reconciled.notes)
        };

        let report = report::render(snapshot, &ops, &notes);
        Reporter::new(self.config.use_colors).print_mismatch(snapshot, &ops, &notes);
        if self.config.preview {
            Ok(Verdict::Match)
        } else {
            Ok(Verdict::Mismatch { report })
        }
    }

    // =====================
    // Update path
    // =====================

    fn run_update(&self, snapshot: &Snapshot, rest: &str, got: &str) -> Result<Verdict, SeamError> {
        let found = markers::scan(rest)?;
        let new_body = if found.is_empty() {
            got.to_string()
        } else {
            let ops = diff::script(rest, got);
            reconcile::splice(rest, got, &found, &ops)
        };

        let rewrite = update::rewrite(&snapshot.location, &new_body, self.config.max_source_bytes)?;
        let reporter = Reporter::new(self.config.use_colors);
        if !rewrite.call_marker_seen {
            reporter.print_warning(&format!("no snapshot call found at {}", snapshot.location));
        }
        reporter.print_updated(&snapshot.location);
        Ok(Verdict::Updated {
            file_text: rewrite.file_text,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
