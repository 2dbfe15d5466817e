//! Structured progress and diagnostic messages for the placement engine.
//!
//! Optimizer passes report progress as [`Diagnostic`] notes carrying a
//! [`DiagnosticCode`]; problems in the input design are reported as warnings.
//! The thread-safe [`DiagnosticSink`] accumulates them and a
//! [`DiagnosticRenderer`] formats them for the terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
