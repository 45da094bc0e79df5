//! Renders a compile's accumulated diagnostics to the terminal. The core never formats these
//! itself (SPEC_FULL.md Non-goals); this is the one place that does.

use colored::Colorize;

use gbatiles_core::diagnostics::{DiagnosticMessage, ErrorsAndWarnings, Severity};

pub fn render(errors: &ErrorsAndWarnings) {
    for diagnostic in errors.diagnostics() {
        let (label, message) = match &diagnostic.message {
            DiagnosticMessage::Warning(kind, message) => (kind.name(), message.clone()),
            DiagnosticMessage::Recoverable(kind, message) => (kind.name(), message.clone()),
        };

        let prefix = match diagnostic.severity {
            Severity::Warning => "warning".yellow().bold(),
            Severity::RecoverableError => "error".red().bold(),
        };

        match &diagnostic.location {
            Some(location) => eprintln!("{prefix}[{label}] {message} ({location})"),
            None => eprintln!("{prefix}[{label}] {message}"),
        }
    }
}
