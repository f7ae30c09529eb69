//! Error taxonomy for the preview pipeline.
//!
//! Four failure classes cross the pipeline:
//! - [`InitError`] - an engine failed its one-time initialization; fatal for
//!   that engine instance, never auto-retried
//! - [`CompileFailure`] - the compiler returned diagnostics or threw;
//!   recoverable, the next snapshot is still processed
//! - [`RenderError`] - the renderer threw during paint; recoverable
//! - [`ImportError`] - a bulk import produced no usable main file
//!
//! Every engine-boundary call is wrapped; no failure crosses the transport
//! unhandled, and a failure never leaves a coordinator stuck busy.

use thiserror::Error;

/// An engine failed to load.
///
/// Cloneable because the memoized initialization outcome is shared by every
/// caller awaiting the same init.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine initialization failed: {0}")]
pub struct InitError(pub String);

/// The compiler engine rejected a snapshot.
///
/// Display is hand-rolled to join the diagnostics block, so no `#[error]`
/// template here.
#[derive(Debug, Clone, Default)]
pub struct CompileFailure {
    /// Structured diagnostics reported by the engine, in engine order.
    pub diagnostics: Vec<String>,
}

impl CompileFailure {
    pub fn new(diagnostics: Vec<String>) -> Self {
        Self { diagnostics }
    }

    /// Single-message failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![message.into()],
        }
    }
}

impl std::fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.diagnostics.is_empty() {
            // Engine produced neither output nor diagnostics
            write!(f, "compilation failed with no diagnostics")
        } else {
            write!(f, "{}", self.diagnostics.join("\n"))
        }
    }
}

impl std::error::Error for CompileFailure {}

/// The renderer engine failed during paint.
#[derive(Debug, Clone, Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// A bulk import could not be turned into a project.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No path ends in the main-file name and none has the source extension.
    #[error("no main file found: expected a file ending in `{0}`")]
    NoMainFile(String),
    /// The import contained no usable entries at all.
    #[error("import contained no files")]
    Empty,
}
