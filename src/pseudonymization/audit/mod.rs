//! Audit trail module
//!
//! Appends one record per pseudonymized document to a local file. Records
//! carry categories, placeholders, lengths and salted hashes, never the
//! original text.

pub mod logger;

pub use logger::AuditLogger;
