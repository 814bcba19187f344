use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::span::Span;

/// Built-in output templates supported by the diagnostic manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticTemplate {
    Pretty,
    Plain,
}

/// Runtime configuration for emitting diagnostics.
#[derive(Debug, Clone)]
pub struct DiagnosticDisplayOptions {
    pub template: DiagnosticTemplate,
    pub verbose_info: bool,
}

impl DiagnosticDisplayOptions {
    pub fn pretty(verbose_info: bool) -> Self {
        Self {
            template: DiagnosticTemplate::Pretty,
            verbose_info,
        }
    }

    pub fn plain(verbose_info: bool) -> Self {
        Self {
            template: DiagnosticTemplate::Plain,
            verbose_info,
        }
    }
}

impl Default for DiagnosticDisplayOptions {
    fn default() -> Self {
        DiagnosticDisplayOptions::pretty(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub span: Option<Span>,
    pub suggestions: Vec<String>,
    pub code: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: None,
            suggestions: Vec::new(),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }

        if !self.suggestions.is_empty() {
            let hints = self.suggestions.join("; ");
            write!(f, " (hints: {})", hints)?;
        }

        Ok(())
    }
}

/// Fire-and-continue diagnostic sink. Shared between pass invocations;
/// adding never fails the pass that reports.
#[derive(Debug, Clone)]
pub struct DiagnosticManager {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Default for DiagnosticManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticManager {
    pub fn new() -> Self {
        Self {
            diagnostics: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }

    pub fn add_diagnostics(&self, mut new_diagnostics: Vec<Diagnostic>) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.append(&mut new_diagnostics);
        }
    }

    pub fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .map(|d| d.iter().any(|diag| diag.level == DiagnosticLevel::Error))
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.clear();
        }
    }

    /// Emit diagnostics to stderr using the provided options. The fallback
    /// context names the producing stage when a diagnostic has no span.
    pub fn emit(
        diagnostics: &[Diagnostic],
        fallback_context: Option<&str>,
        options: &DiagnosticDisplayOptions,
    ) {
        for diagnostic in diagnostics {
            let context = fallback_context.unwrap_or("pipeline");
            if let Some(lines) = render(diagnostic, context, options) {
                for line in lines {
                    eprintln!("{}", line);
                }
            }
        }
    }
}

static GLOBAL_DIAGNOSTIC_MANAGER: Lazy<Arc<DiagnosticManager>> =
    Lazy::new(|| Arc::new(DiagnosticManager::new()));

pub fn diagnostic_manager() -> Arc<DiagnosticManager> {
    GLOBAL_DIAGNOSTIC_MANAGER.clone()
}

/// Record an error diagnostic in the global manager and hand back an
/// [`Error`](crate::error::Error) carrying it.
pub fn report_error(message: impl Into<String>) -> crate::error::Error {
    let diagnostic = Diagnostic::error(message.into());
    diagnostic_manager().add_diagnostic(diagnostic.clone());
    crate::error::Error::diagnostic(diagnostic)
}

fn render(
    diagnostic: &Diagnostic,
    context: &str,
    options: &DiagnosticDisplayOptions,
) -> Option<Vec<String>> {
    if matches!(diagnostic.level, DiagnosticLevel::Info) && !options.verbose_info {
        return None;
    }

    let level = match diagnostic.level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
        DiagnosticLevel::Info => "info",
    };

    let header = match (options.template, diagnostic.code.as_ref()) {
        (DiagnosticTemplate::Pretty, Some(code)) => {
            format!("{}[{}]: {} ({})", level, context, diagnostic.message, code)
        }
        (DiagnosticTemplate::Pretty, None) => {
            format!("{}[{}]: {}", level, context, diagnostic.message)
        }
        (DiagnosticTemplate::Plain, Some(code)) => {
            format!("[{}] {}: {} ({})", context, level, diagnostic.message, code)
        }
        (DiagnosticTemplate::Plain, None) => {
            format!("[{}] {}: {}", context, level, diagnostic.message)
        }
    };

    let mut lines = vec![header];

    if let Some(span) = &diagnostic.span {
        lines.push(format!("   at {}", span));
    }

    for suggestion in &diagnostic.suggestions {
        lines.push(format!("   suggestion: {}", suggestion));
    }

    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_collects_and_reports_errors() {
        let manager = DiagnosticManager::new();
        assert!(!manager.has_errors());

        manager.add_diagnostic(Diagnostic::warning("unused label"));
        assert!(!manager.has_errors());

        manager.add_diagnostic(
            Diagnostic::error("misplaced operator")
                .with_span(Span::new(1, 10, 12))
                .with_code("E0571"),
        );
        assert!(manager.has_errors());

        let all = manager.get_diagnostics();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].code.as_deref(), Some("E0571"));

        manager.clear();
        assert!(manager.get_diagnostics().is_empty());
    }

    #[test]
    fn display_includes_code_and_hints() {
        let diagnostic = Diagnostic::error("misplaced operator")
            .with_code("E0571")
            .with_suggestion("wrap the expression in a try block");
        assert_eq!(
            diagnostic.to_string(),
            "misplaced operator [E0571] (hints: wrap the expression in a try block)"
        );
    }
}
