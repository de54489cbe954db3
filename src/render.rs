//! The value-renderer seam between tests and the comparison engine.
//!
//! The engine never formats values itself; it asks a [`Renderable`] for
//! canonical text and compares that. Two wrappers cover the common cases:
//! [`Structural`] for anything `Debug`, and [`WithRender`] for values that
//! supply their own rendering closure. Plain strings render as themselves,
//! which keeps direct text comparisons free of wrapper noise.

use std::fmt::Debug;

use crate::SeamError;

/// Options passed through to whichever renderer produces the "got" text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Multi-line structural output (`{:#?}`) when true, single-line (`{:?}`)
    /// when false.
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Capability interface for turning a runtime value into canonical text.
///
/// Renderer failure is fatal for the comparison: with no rendered text there
/// is no verdict to produce.
pub trait Renderable {
    fn render(&self, options: &RenderOptions) -> Result<String, SeamError>;
}

/// The default structural renderer: formats the wrapped value with the
/// standard debug formatter. Infallible.
pub struct Structural<T: Debug>(pub T);

impl<T: Debug> Renderable for Structural<T> {
    fn render(&self, options: &RenderOptions) -> Result<String, SeamError> {
        if options.pretty {
            Ok(format!("{:#?}", self.0))
        } else {
            Ok(format!("{:?}", self.0))
        }
    }
}

/// A value-supplied renderer: the wrapped closure produces the text and may
/// fail with a [`SeamError::Render`].
pub struct WithRender<F>(pub F)
where
    F: Fn(&RenderOptions) -> Result<String, SeamError>;

impl<F> Renderable for WithRender<F>
where
    F: Fn(&RenderOptions) -> Result<String, SeamError>,
{
    fn render(&self, options: &RenderOptions) -> Result<String, SeamError> {
        (self.0)(options)
    }
}

impl Renderable for str {
    fn render(&self, _options: &RenderOptions) -> Result<String, SeamError> {
        Ok(self.to_string())
    }
}

impl Renderable for String {
    fn render(&self, _options: &RenderOptions) -> Result<String, SeamError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod render_tests {
    use crate::diagnostics::render_error;

    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_structural_render_respects_pretty() {
        let value = Structural(Point { x: 1, y: 2 });
        let pretty = value.render(&RenderOptions { pretty: true }).unwrap();
        let compact = value.render(&RenderOptions { pretty: false }).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(compact, "Point { x: 1, y: 2 }");
    }

    #[test]
    fn test_str_renders_identically() {
        let got = "already text".render(&RenderOptions::default()).unwrap();
        assert_eq!(got, "already text");
    }

    #[test]
    fn test_with_render_propagates_failure() {
        let value = WithRender(|_: &RenderOptions| Err(render_error("value refused to render")));
        let err = value.render(&RenderOptions::default()).unwrap_err();
        assert!(matches!(err, SeamError::Render { .. }));
    }
}
