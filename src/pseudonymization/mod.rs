//! Pseudonymization module for Kinetic
//!
//! This module finds identifying spans in Dutch medical text and replaces
//! them with stable placeholders, turning absolute dates into a relative
//! timeline.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Recognizers**: checksum-validated patterns, gazetteers, name heuristics and dates
//! - **Resolver**: reduces overlapping candidates to one disjoint span list
//! - **Registry**: session-scoped `(category, text)` to sequence number mapping
//! - **Timeline**: anchors each document on one date and renders `[T+N]` offsets
//! - **Rewriter**: substitutes placeholders and records the audit trail
//!
//! # Usage
//!
//! ```rust
//! use kinetic::pseudonymization::{PseudonymizationEngine, PseudonymizationConfig};
//!
//! # fn example() -> kinetic::domain::Result<()> {
//! let engine = PseudonymizationEngine::new(PseudonymizationConfig::default())?;
//! let session = engine.new_session();
//! let result = session.process("Mail naar j.jansen@example.nl")?;
//! assert_eq!(result.pseudonymized_text, "Mail naar [EMAIL]");
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod models;
pub mod preprocess;
pub mod recognizer;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rewriter;
pub mod timeline;
pub mod validators;

// Re-export main types
pub use config::PseudonymizationConfig;
pub use engine::{new_session, BatchOutcome, PseudonymizationEngine, Session};
pub use models::{Category, Document, PseudonymizedDocument, Span};
pub use registry::LabelRegistry;
pub use report::BatchReport;
pub use timeline::AnchorPolicy;
