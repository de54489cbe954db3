pub use crate::diagnostics::{to_error_source, ErrorContext, SeamError, SourceArc, Span};
pub use crate::engine::{Engine, EngineConfig, Snapshot, SourceLocation, Verdict};
pub use crate::render::{Renderable, RenderOptions, Structural, WithRender};

pub mod block;
pub mod diagnostics;
pub mod diff;
pub mod engine;
pub mod markers;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod update;
