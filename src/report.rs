//! Diagnostic rendering with source context.
//!
//! Engine diagnostics carry a unit name and a line/column position; this module turns them into `miette` reports
//! that point into the original source text.

use std::collections::BTreeMap;
use std::fmt;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use refine_core::{Diagnostic, Location, Severity};

/// One engine diagnostic bound to the source it was reported against.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceReport {
    message: String,
    code: &'static str,
    help: Option<String>,
    severity: Severity,
    src: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl SourceReport {
    /// Bind `diagnostic` to its unit's text, when that text is known.
    pub fn new(diagnostic: &Diagnostic, sources: &BTreeMap<String, String>) -> Self {
        let bound = diagnostic.location.as_ref().and_then(|loc| {
            let text = sources.get(&loc.unit)?;
            let span = span_of(text, loc)?;
            Some((NamedSource::new(loc.unit.clone(), text.clone()), span))
        });
        let (src, span) = match bound {
            Some((src, span)) => (Some(src), Some(span)),
            None => (None, None),
        };
        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code,
            help: diagnostic.help.clone(),
            severity: diagnostic.severity,
            src,
            span,
        }
    }
}

impl miette::Diagnostic for SourceReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.as_ref().map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.src.as_ref().map(|s| s as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("declared here".to_string()),
            span,
        ))))
    }
}

/// Byte span of a 1-based line / 0-based character column inside `text`.
fn span_of(text: &str, loc: &Location) -> Option<SourceSpan> {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(loc.line.checked_sub(1)?)
        .map(str::len)
        .sum();
    let line = text[line_start..].lines().next().unwrap_or("");
    let byte_at = |column: usize| {
        line.char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    };
    let start = byte_at(loc.column);
    let end = byte_at(loc.column + loc.len).max(start);
    Some(SourceSpan::from((line_start + start, end - start)))
}

/// Render a diagnostic as plain text (no colors), for logs and tests.
pub fn render_plain(diagnostic: &Diagnostic, sources: &BTreeMap<String, String>) -> String {
    let report = SourceReport::new(diagnostic, sources);
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, &report).is_err() {
        return diagnostic.to_string();
    }
    out
}

/// Print a diagnostic to stderr through the installed `miette` handler.
pub fn emit(diagnostic: &Diagnostic, sources: &BTreeMap<String, String>) {
    let report = miette::Report::new(SourceReport::new(diagnostic, sources));
    eprintln!("{report:?}");
}
