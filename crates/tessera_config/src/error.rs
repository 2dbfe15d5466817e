//! Errors from reading `tessera.toml`.

/// Why a configuration could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read tessera.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the schema.
    #[error("malformed tessera.toml: {0}")]
    ParseError(String),

    /// A setting is out of range.
    #[error("invalid setting: {0}")]
    ValidationError(String),
}
