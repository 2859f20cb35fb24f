//! The diagnostic type and constructor helpers for the engine's error kinds.

use std::fmt;

use dingo_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with the context needed for a useful error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Labeled spans showing where the error occurred.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}

// Constructor helpers for the engine's diagnostic kinds.

/// Create a "cannot infer type" diagnostic.
pub fn inference_failure(span: Span, what: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!("cannot infer type of {what}"))
        .with_label(span, "type unknown here")
        .with_note("supply a type-info table or annotate the expression")
}

/// Create a "`None` requires annotation" diagnostic with a fix-it hint.
pub fn none_requires_annotation(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message("cannot determine the element type of `None`")
        .with_label(span, "no enclosing context names a type")
        .with_suggestion("annotate the binding, e.g. `var x Option<int> = None`")
}

/// Create a "non-exhaustive match" diagnostic naming the missing variants.
pub fn non_exhaustive(span: Span, missing: &[String]) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "match is not exhaustive: missing {}",
            missing.join(", ")
        ))
        .with_label(span, "uncovered variants")
        .with_suggestion("enumerate the missing variants or add a wildcard arm: `_ => …`")
}

/// Create a "non-exhaustive tuple match" diagnostic naming missing points.
pub fn non_exhaustive_tuple(span: Span, missing: &[String]) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!(
            "tuple match is not exhaustive: missing {}",
            missing.join(", ")
        ))
        .with_label(span, "uncovered combinations")
        .with_suggestion("add arms for the missing combinations or a wildcard arm")
}

/// Create a "synthetic type collision" diagnostic.
pub fn registry_collision(span: Span, canonical: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "synthetic type `{canonical}` registered with conflicting parameters"
        ))
        .with_label(span, "second registration here")
        .with_note("the first registration wins; generated code may be inconsistent")
}

/// Create a "marker unassociated" warning.
pub fn marker_unassociated(span: Span, marker: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E4001)
        .with_message(format!(
            "marker `{marker}` has no candidate target within the association threshold"
        ))
        .with_label(span, "marker dropped")
}

/// Create a "malformed marker" warning.
pub fn marker_malformed(span: Span, payload: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E4002)
        .with_message(format!("malformed marker payload `{payload}`"))
        .with_label(span, "marker ignored")
}

/// Create a "nullable receiver required" diagnostic.
pub fn nullable_required(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E5001)
        .with_message(format!(
            "safe navigation requires a pointer or Option receiver, found `{found}`"
        ))
        .with_label(span, "receiver is not nullable")
}

/// Create a "constructor arity" diagnostic.
pub fn invalid_arity(span: Span, ctor: &str, expected: usize, found: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E6001)
        .with_message(format!(
            "constructor `{ctor}` expects {expected} argument(s), found {found}"
        ))
        .with_label(span, "wrong argument count")
}

/// Create an "internal error" diagnostic.
pub fn internal(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!("internal error: {detail}"))
        .with_label(span, "while transforming this node")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error(ErrorCode::E1001)
            .with_message("test error")
            .with_label(Span::new(0, 5), "here")
            .with_note("some context")
            .with_suggestion("try this");

        assert_eq!(diag.code, ErrorCode::E1001);
        assert_eq!(diag.message, "test error");
        assert!(diag.is_error());
        assert_eq!(diag.labels.len(), 1);
        assert!(diag.labels[0].is_primary);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.suggestions.len(), 1);
    }

    #[test]
    fn test_non_exhaustive_names_missing() {
        let diag = non_exhaustive(
            Span::new(10, 20),
            &["Approved".to_string(), "Rejected".to_string()],
        );

        assert_eq!(diag.code, ErrorCode::E2001);
        assert!(diag.message.contains("Approved"));
        assert!(diag.message.contains("Rejected"));
        assert!(!diag.suggestions.is_empty());
        assert_eq!(diag.primary_span(), Some(Span::new(10, 20)));
    }

    #[test]
    fn test_marker_unassociated_is_warning() {
        let diag = marker_unassociated(Span::new(0, 5), "DINGO_PATTERN: Ok(v)");
        assert!(!diag.is_error());
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn test_display_format() {
        let diag = Diagnostic::error(ErrorCode::E2001)
            .with_message("test error")
            .with_label(Span::new(0, 5), "primary")
            .with_note("a note")
            .with_suggestion("a suggestion");

        let output = diag.to_string();
        assert!(output.contains("error [E2001]: test error"));
        assert!(output.contains("--> "));
        assert!(output.contains("= note: a note"));
        assert!(output.contains("= help: a suggestion"));
    }
}
