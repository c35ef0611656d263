//! Data models for the pseudonymization engine

pub mod document;
pub mod span;

pub use document::{
    AuditEntry, Document, DocumentStatistics, PseudonymizedDocument, RegistryEntry,
    RegistrySnapshot,
};
pub use span::{Category, PlaceholderPolicy, Span};
