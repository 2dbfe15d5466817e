//! Common result and error types for the Tessera workspace.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a broken internal invariant (for example a pin that
/// references a node that does not exist), not a user-facing problem. User
/// conditions are reported through the diagnostics sink and the operation
/// still returns `Ok`.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating inconsistent data or a bug in Tessera.
#[derive(Debug, thiserror::Error)]
#[error("internal placement error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
