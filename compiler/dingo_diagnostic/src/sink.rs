//! Per-file diagnostic sink.
//!
//! The sink collects diagnostics in emission order without ever failing:
//! plugins report and continue. After a run the driver flushes the sink to
//! the logging facade at the recorded severities. A non-empty sink marks the
//! rewritten file as unsafe to consume.

use crate::{Diagnostic, Severity};

/// Ordered collector of diagnostics for one file.
#[derive(Debug, Default, Clone)]
pub struct Sink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl Sink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Never fails; callers continue.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// All recorded diagnostics, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Whether any error-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Whether anything at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Emit every diagnostic through `tracing` at its severity.
    ///
    /// Severity levels are advisory; the engine never branches on them.
    pub fn flush_to_log(&self) {
        for diag in &self.diagnostics {
            match diag.severity {
                Severity::Error => tracing::error!(code = diag.code.as_str(), "{diag}"),
                Severity::Warning => tracing::warn!(code = diag.code.as_str(), "{diag}"),
                Severity::Note => tracing::info!(code = diag.code.as_str(), "{diag}"),
                Severity::Help => tracing::debug!(code = diag.code.as_str(), "{diag}"),
            }
        }
    }

    /// Take all diagnostics out of the sink, leaving it empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostic, ErrorCode};
    use dingo_ir::Span;

    #[test]
    fn test_sink_orders_and_counts() {
        let mut sink = Sink::new();
        sink.report(diagnostic::marker_unassociated(Span::new(0, 1), "m"));
        sink.report(diagnostic::inference_failure(Span::new(5, 9), "identifier `x`"));

        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.has_errors());
        assert_eq!(sink.diagnostics()[0].code, ErrorCode::E4001);
        assert_eq!(sink.diagnostics()[1].code, ErrorCode::E1001);
    }

    #[test]
    fn test_drain_resets() {
        let mut sink = Sink::new();
        sink.report(diagnostic::inference_failure(Span::DUMMY, "call result"));
        let drained = sink.drain();

        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
        assert!(!sink.has_errors());
    }
}
