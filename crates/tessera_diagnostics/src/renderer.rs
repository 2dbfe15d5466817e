//! Text output of diagnostics, one header line plus one line per footnote.

use crate::diagnostic::Diagnostic;

/// Turns diagnostics into text.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic, newline-terminated.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a log in emission order.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

/// Plain terminal log, optionally with a coloured severity.
///
/// ```text
/// note[P306]: Pass   1 of global swaps; hpwl is 1.234500e4.
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Wrap the severity in ANSI colour codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let ansi = match diag.severity {
            crate::Severity::Note => "36",
            crate::Severity::Warning => "33",
            crate::Severity::Error => "31",
        };
        format!("\x1b[{ansi}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.severity_label(diag),
            diag.code,
            diag.message
        );
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}
