//! Collects diagnostics from the optimizer and the segment manager.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Append-only, thread-safe diagnostic store with per-severity counters.
///
/// Counters are atomics so severity checks never take the lock.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
    counts: [AtomicUsize; 3],
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.counts[diag.severity.slot()].fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diag);
    }

    /// Number of diagnostics of `severity` emitted so far, including any
    /// already taken.
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.slot()].load(Ordering::Relaxed)
    }

    /// Returns `true` once any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of errors emitted so far.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warnings emitted so far.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Drains the stored diagnostics. Counters are kept.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *entries)
    }

    /// Copies the stored diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Copies the stored diagnostics carrying `code`.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|d| d.code == code)
            .cloned()
            .collect()
    }
}
