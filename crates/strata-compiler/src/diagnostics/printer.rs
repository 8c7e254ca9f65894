//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{Annotation, AnnotationKind, Group, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::Severity;
use crate::{Error, SourceMap, Span};

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: Option<&'s SourceMap>,
    colored: bool,
    notes: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            sources: None,
            colored: false,
            notes: true,
        }
    }

    /// Render manifest diagnostics as annotated snippets.
    pub fn sources(mut self, sources: &'s SourceMap) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Whether to include informational notes.
    pub fn notes(mut self, value: bool) -> Self {
        self.notes = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = renderer(self.colored);
        let shown = self
            .diagnostics
            .iter()
            .filter(|d| self.notes || d.severity() != Severity::Note);

        for (i, diag) in shown.enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let (Some(sources), Some(span)) = (self.sources, diag.span()) else {
                writeln!(w, "{diag}")?;
                continue;
            };
            let Some(mut snippet) = source_snippet(sources, span, &diag.message) else {
                writeln!(w, "{diag}")?;
                continue;
            };

            // Related spans in other manifests cannot share the snippet.
            for related in diag.related.iter().filter(|r| r.span.source == span.source) {
                let limit = sources.get(span.source).map_or(0, |s| s.text.len());
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(&related.span, limit))
                        .label(&related.message),
                );
            }

            let level = severity_to_level(diag.severity());
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
            writeln!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

/// Render a fatal error, with a manifest snippet when the error points into one.
pub fn render_error(error: &Error, sources: &SourceMap, colored: bool) -> String {
    let message = error.to_string();
    let title = if error.is_internal() {
        format!("internal error: {message}")
    } else {
        message
    };

    let snippet = error
        .location()
        .and_then(|at| source_snippet(sources, &at.span, &title));

    match snippet {
        Some(snippet) => {
            let report: Vec<Group> = vec![Level::ERROR.primary_title(&title).element(snippet)];
            renderer(colored).render(&report).to_string()
        }
        None => format!("error: {title}"),
    }
}

fn source_snippet<'a>(
    sources: &'a SourceMap,
    span: &Span,
    label: &'a str,
) -> Option<Snippet<'a, Annotation<'a>>> {
    let source = sources.get(span.source)?;
    let range = adjust_range(span, source.text.len());
    Some(
        Snippet::source(&source.text)
            .line_start(1)
            .path(&source.name)
            .annotation(AnnotationKind::Primary.span(range).label(label)),
    )
}

fn renderer(colored: bool) -> Renderer {
    if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Warning => Level::WARNING,
        Severity::Note => Level::NOTE,
    }
}

fn adjust_range(span: &Span, limit: usize) -> std::ops::Range<usize> {
    let start = span.range.start.min(limit);
    let end = span.range.end.min(limit);

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}
