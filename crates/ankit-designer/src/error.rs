//! Error types for ankit-designer.
//!
//! The converters never fail: malformed templates degrade to literal text
//! and are reported as [`Diagnostic`](crate::forward::Diagnostic)s instead.
//! The errors below only come from the file and serialization boundaries.

use thiserror::Error;

/// Result type for ankit-designer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or saving template definitions.
#[derive(Debug, Error)]
pub enum Error {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template not found in the definition.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Two templates share a name.
    #[error("duplicate template name: {0}")]
    DuplicateTemplate(String),

    /// Invalid template definition.
    #[error("invalid template definition: {0}")]
    InvalidDefinition(String),
}
