//! Unified, `miette`-based diagnostic system for the snapshot engine.
//!
//! Every failure mode outside a normal mismatch verdict is represented here.
//! Errors that can point at a concrete byte range (a malformed literal block,
//! an ignore marker sitting at the edge of a snapshot) carry an
//! [`ErrorContext`] with an attached source and span so `miette` can render
//! the offending line. Errors with nothing to point at (I/O failures, render
//! failures) carry a message and, where one exists, the underlying cause.
//!
//! Construction goes through the free helpers at the bottom of this module
//! (`format_error`, `io_error`, ...). Callers never build `ErrorContext` by
//! hand.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

// Type aliases for clarity and brevity
pub type SourceArc = Arc<NamedSource<String>>;

/// A half-open byte range into one specific string.
///
/// Offsets are never mixed between expected-space and got-space without an
/// explicit mapping step; see the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with both source and span.
    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Unified error type for all snapshot-engine failure modes.
///
/// A failing comparison is not an error: it is the `Mismatch` verdict. The
/// variants here are the conditions under which no trustworthy verdict can be
/// produced at all.
#[derive(Debug, Error)]
pub enum SeamError {
    #[error("Format error: {message}")]
    Format { message: String, ctx: ErrorContext },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Pattern error: {message}")]
    Pattern { message: String, ctx: ErrorContext },
    #[error("Too many ignore regions: found more than {limit} in one snapshot")]
    TooManyIgnoreRegions { limit: usize, ctx: ErrorContext },
    #[error("Render error: {message}")]
    Render { message: String },
}

impl SeamError {
    fn get_ctx(&self) -> Option<&ErrorContext> {
        match self {
            SeamError::Format { ctx, .. }
            | SeamError::Io { ctx, .. }
            | SeamError::Pattern { ctx, .. }
            | SeamError::TooManyIgnoreRegions { ctx, .. } => Some(ctx),
            SeamError::Render { .. } => None,
        }
    }

    fn label_text(&self) -> String {
        match self {
            SeamError::Format { message, .. } => message.clone(),
            SeamError::Io { message, .. } => message.clone(),
            SeamError::Pattern { message, .. } => message.clone(),
            SeamError::TooManyIgnoreRegions { .. } => "first region past the cap".to_string(),
            SeamError::Render { message } => message.clone(),
        }
    }
}

impl Diagnostic for SeamError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        None
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()?
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()?
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.get_ctx()?.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.label_text()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a named source string into an `Arc<NamedSource<String>>` for use
/// in error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(
        name.as_ref(),
        source.as_ref().to_string(),
    ))
}

/// A source-file shape violation: the file no longer matches the call-site or
/// literal-block layout the snapshot was written against.
pub fn format_error(message: impl Into<String>, source: &SourceArc, span: Span) -> SeamError {
    SeamError::Format {
        message: message.into(),
        ctx: ErrorContext::with_source_and_span(SourceArc::clone(source), span),
    }
}

/// A file read, stat, or write failure, chaining the underlying cause when
/// one exists.
pub fn io_error(message: impl Into<String>, cause: Option<std::io::Error>) -> SeamError {
    SeamError::Io {
        message: message.into(),
        ctx: ErrorContext::none(),
        source: cause.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>),
    }
}

/// More ignore regions than the scanner is willing to process; `span` points
/// at the first occurrence past the cap.
pub fn too_many_regions(limit: usize, source: &SourceArc, span: Span) -> SeamError {
    SeamError::TooManyIgnoreRegions {
        limit,
        ctx: ErrorContext::with_source_and_span(SourceArc::clone(source), span)
            .help("split the snapshot, or loosen one pattern to cover several volatile spans"),
    }
}

/// A value renderer failure; no verdict is possible.
pub fn render_error(message: impl Into<String>) -> SeamError {
    SeamError::Render {
        message: message.into(),
    }
}
