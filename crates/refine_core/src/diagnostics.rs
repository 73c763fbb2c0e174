//! Generation-time errors and diagnostics.
//!
//! Two layers live here:
//! - [`GenerationError`]: why a single candidate (or source unit) could not be processed. Errors never cross candidate
//!   boundaries; one failing wrapper does not stop the others.
//! - [`Diagnostic`]: a `Send` report with a severity, a stable code and an optional location, suitable for rendering
//!   by the CLI or for tests.
//!
//! ## Notes
//! - Runtime failures of *generated* code (`create` returning `Err`) are not represented here; those belong to the
//!   generated type's callers.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use proc_macro2::Span;
use thiserror::Error;

/// Why a candidate or source unit could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum GenerationError {
    #[error("could not resolve options from `{expr}`")]
    #[diagnostic(
        code(refine::options),
        help("combine flag names with `|`, e.g. `ToString | Equals`, or use an integer bitmask")
    )]
    UnresolvedOptions { expr: String },

    #[error("malformed `#[refined]` attribute: {reason}")]
    #[diagnostic(code(refine::attribute), help("expected `#[refined(BaseType)]` or `#[refined(BaseType, FLAGS)]`"))]
    MalformedAttribute { reason: String },

    #[error("`{wrapper}` is generic; refined wrappers over type parameters are not supported")]
    #[diagnostic(code(refine::generic))]
    UnsupportedGeneric { wrapper: String },

    #[error("base type `{base}` of `{wrapper}` cannot be resolved: {reason}")]
    #[diagnostic(code(refine::base_type))]
    UnresolvableBaseType {
        wrapper: String,
        base: String,
        reason: String,
    },

    #[error("generated code for `{wrapper}` could not be rendered: {reason}")]
    #[diagnostic(code(refine::render))]
    Render { wrapper: String, reason: String },

    #[error("`{wrapper}` would be written to `{file}`, which is also the unit of `{other}`")]
    #[diagnostic(code(refine::output), help("rename one of the wrappers or move it into another module"))]
    OutputCollision { wrapper: String, other: String, file: String },

    #[error("failed to parse `{unit}`: {reason}")]
    #[diagnostic(code(refine::parse))]
    Parse { unit: String, reason: String },
}

impl GenerationError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::UnresolvedOptions { .. } => "refine::options",
            GenerationError::MalformedAttribute { .. } => "refine::attribute",
            GenerationError::UnsupportedGeneric { .. } => "refine::generic",
            GenerationError::UnresolvableBaseType { .. } => "refine::base_type",
            GenerationError::Render { .. } => "refine::render",
            GenerationError::OutputCollision { .. } => "refine::output",
            GenerationError::Parse { .. } => "refine::parse",
        }
    }

    /// Fill in the wrapper name of an error raised before the wrapper was known.
    pub fn attributed_to(self, name: &str) -> Self {
        match self {
            GenerationError::UnresolvableBaseType { base, reason, .. } => GenerationError::UnresolvableBaseType {
                wrapper: name.to_string(),
                base,
                reason,
            },
            GenerationError::Render { reason, .. } => GenerationError::Render {
                wrapper: name.to_string(),
                reason,
            },
            other => other,
        }
    }
}

/// Code of the once-per-run "no candidates" warning.
pub const NO_CANDIDATES_CODE: &str = "refine::no_candidates";

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A 1-based line / 0-based column position inside a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub unit: String,
    pub line: usize,
    pub column: usize,
    /// Length of the highlighted region in characters on `line`.
    pub len: usize,
}

impl Location {
    /// Build a location from a span inside the named unit.
    pub fn from_span(unit: &str, span: Span) -> Self {
        let start = span.start();
        let end = span.end();
        let len = if end.line == start.line {
            end.column.saturating_sub(start.column).max(1)
        } else {
            1
        };
        Self {
            unit: unit.to_string(),
            line: start.line,
            column: start.column,
            len,
        }
    }
}

/// A rendered-agnostic report produced by a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub help: Option<String>,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn error(err: &GenerationError, location: Option<Location>) -> Self {
        Self {
            severity: Severity::Error,
            code: err.code(),
            message: err.to_string(),
            help: err.help().map(|h| h.to_string()),
            location,
        }
    }

    /// The once-per-run warning emitted when a compilation has no candidates at all.
    pub fn no_candidates() -> Self {
        Self {
            severity: Severity::Warning,
            code: NO_CANDIDATES_CODE,
            message: "no `#[refined]` declarations were found to generate".to_string(),
            help: Some("declare a unit struct placeholder, e.g. `#[refined(i32)] pub struct Score;`".to_string()),
            location: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " ({}:{}:{})", loc.unit, loc.line, loc.column + 1)?;
        }
        Ok(())
    }
}
