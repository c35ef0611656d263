//! Domain error types
//!
//! This module defines the error hierarchy for Kinetic. All errors are
//! domain-specific and don't expose third-party types.
//!
//! Two kinds of detection outcome are not errors: a candidate
//! that fails its checksum is dropped by its recognizer, and a candidate that
//! loses the overlap sweep is dropped by the resolver. Both are only counted
//! in the per-document statistics.

use thiserror::Error;

/// Main Kinetic error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum KineticError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input or argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// Gazetteer could not be loaded or parsed
    #[error("Gazetteer error: {0}")]
    Gazetteer(String),

    /// Pattern library could not be loaded or compiled
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// A relative date was requested for a document without an anchor date.
    ///
    /// Fatal for the document, the rest of the batch continues.
    #[error("Date resolution error: {0}")]
    DateResolution(String),

    /// The label registry resolved one key to two numbers, or two keys to one.
    ///
    /// Fatal for the whole session.
    #[error("Registry consistency error: {0}")]
    RegistryConsistency(String),

    /// A document exceeded the batch driver's time budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl KineticError {
    /// Whether this error invalidates the session (and its label registry)
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::RegistryConsistency(_))
    }

    /// Whether this error only invalidates the current document
    pub fn is_document_fatal(&self) -> bool {
        matches!(self, Self::DateResolution(_) | Self::Timeout(_))
    }
}

/// Per-document failure detail used by the batch driver
#[derive(Debug, Clone)]
pub struct DocumentErrorDetail {
    /// Document identifier associated with the error
    pub document_id: Option<String>,

    /// Error message
    pub message: String,

    /// Whether the session had to be aborted
    pub session_fatal: bool,
}

impl DocumentErrorDetail {
    /// Creates a new document error detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            document_id: None,
            message: message.into(),
            session_fatal: false,
        }
    }

    /// Sets the document ID
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Marks the error as session fatal
    pub fn session_fatal(mut self) -> Self {
        self.session_fatal = true;
        self
    }
}

impl From<&KineticError> for DocumentErrorDetail {
    fn from(err: &KineticError) -> Self {
        let detail = Self::new(err.to_string());
        if err.is_session_fatal() {
            detail.session_fatal()
        } else {
            detail
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for KineticError {
    fn from(err: std::io::Error) -> Self {
        KineticError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for KineticError {
    fn from(err: serde_json::Error) -> Self {
        KineticError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for KineticError {
    fn from(err: toml::de::Error) -> Self {
        KineticError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinetic_error_display() {
        let err = KineticError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fatality_classification() {
        let registry = KineticError::RegistryConsistency("dup".to_string());
        assert!(registry.is_session_fatal());
        assert!(!registry.is_document_fatal());

        let date = KineticError::DateResolution("no anchor".to_string());
        assert!(!date.is_session_fatal());
        assert!(date.is_document_fatal());

        let config = KineticError::Configuration("bad".to_string());
        assert!(!config.is_session_fatal());
        assert!(!config.is_document_fatal());
    }

    #[test]
    fn test_document_error_detail_builder() {
        let detail = DocumentErrorDetail::new("Test error")
            .with_document_id("brief-001")
            .session_fatal();

        assert_eq!(detail.document_id, Some("brief-001".to_string()));
        assert!(detail.session_fatal);
    }

    #[test]
    fn test_document_error_detail_from_error() {
        let err = KineticError::RegistryConsistency("collision".to_string());
        let detail = DocumentErrorDetail::from(&err);
        assert!(detail.session_fatal);
        assert!(detail.message.contains("collision"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: KineticError = io_err.into();
        assert!(matches!(err, KineticError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: KineticError = json_err.into();
        assert!(matches!(err, KineticError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: KineticError = toml_err.into();
        assert!(matches!(err, KineticError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
