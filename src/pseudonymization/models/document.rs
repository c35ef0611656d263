//! Input documents and pseudonymization results

use super::span::Category;
use crate::domain::ids::DocumentId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single document handed to the engine by the extraction collaborator
#[derive(Debug, Clone)]
pub struct Document {
    /// Caller-supplied or generated identifier
    pub id: DocumentId,
    /// Extracted plain text
    pub text: String,
}

impl Document {
    /// Create a document with a generated identifier
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: DocumentId::generate(),
            text: text.into(),
        }
    }

    /// Create a document with a known identifier
    pub fn with_id(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// One substitution, in document order. Never carries the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Category of the replaced span
    pub category: Category,
    /// Placeholder written in its place
    pub placeholder: String,
    /// Length of the original span in characters
    pub span_length: usize,
}

/// One registry entry as exported for debugging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub category: Category,
    pub placeholder: String,
    /// Normalized (case-folded, whitespace-collapsed) entity text
    pub normalized_text: String,
}

/// Point-in-time copy of the label registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Entries sorted by category, then sequence number
    pub entries: Vec<RegistryEntry>,
}

impl RegistrySnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Placeholder registered for a normalized entity text, if any
    pub fn placeholder_for(&self, category: Category, normalized_text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.category == category && e.normalized_text == normalized_text)
            .map(|e| e.placeholder.as_str())
    }
}

/// Detection statistics for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Substitutions per category
    pub substitutions: BTreeMap<Category, usize>,
    /// Candidates dropped because their checksum or shape check failed
    pub validation_failures: usize,
    /// Candidates dropped by the overlap sweep
    pub overlaps_discarded: usize,
}

impl DocumentStatistics {
    pub fn total_substitutions(&self) -> usize {
        self.substitutions.values().sum()
    }
}

/// Result of pseudonymizing one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudonymizedDocument {
    /// Document identifier
    pub document_id: DocumentId,
    /// Text with every detected span replaced by its placeholder
    pub pseudonymized_text: String,
    /// One entry per substitution, in document order
    pub audit_record: Vec<AuditEntry>,
    /// Registry state after this document
    pub label_registry_snapshot: RegistrySnapshot,
    /// Anchor date of the relative timeline (local use only, never exported)
    #[serde(skip_serializing)]
    pub anchor: Option<NaiveDate>,
    /// Detection statistics
    pub statistics: DocumentStatistics,
    /// Non-fatal issues the operator should review
    pub warnings: Vec<String>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Timestamp of processing
    pub timestamp: DateTime<Utc>,
}

impl PseudonymizedDocument {
    /// Total number of substitutions
    pub fn total_substitutions(&self) -> usize {
        self.audit_record.len()
    }

    /// Whether anything was replaced
    pub fn has_substitutions(&self) -> bool {
        !self.audit_record.is_empty()
    }
}
