//! Identifier newtypes for documents and sessions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Document identifier newtype wrapper
///
/// Supplied by the caller (usually the source file name) or generated.
///
/// # Examples
///
/// ```
/// use kinetic::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("verslag-2024-01.txt").unwrap();
/// assert_eq!(id.as_str(), "verslag-2024-01.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId from a string
    ///
    /// Returns `Err` for empty identifiers or identifiers containing control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        if id.chars().any(char::is_control) {
            return Err(format!(
                "Document ID must not contain control characters: {id:?}"
            ));
        }
        Ok(Self(id))
    }

    /// Generates a random document identifier
    pub fn generate() -> Self {
        Self(format!("doc-{}", Uuid::new_v4()))
    }

    /// Returns the document ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Session identifier, one per label registry lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a fresh random session identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_valid() {
        let id = DocumentId::new("brief.txt").unwrap();
        assert_eq!(id.as_str(), "brief.txt");
        assert_eq!(id.to_string(), "brief.txt");
    }

    #[test]
    fn test_document_id_empty() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("   ").is_err());
    }

    #[test]
    fn test_document_id_control_chars() {
        assert!(DocumentId::new("brief\n.txt").is_err());
    }

    #[test]
    fn test_document_id_generate_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("doc-"));
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
