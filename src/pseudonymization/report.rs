//! Batch reporting for pseudonymization sessions
//!
//! Aggregates per-document statistics, failures and warnings into a report
//! that can be printed to the console or written as JSON.

use crate::domain::{DocumentErrorDetail, Result, SessionId};
use crate::pseudonymization::models::{Category, PseudonymizedDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Batch report for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Session the documents were processed in
    pub session_id: Option<SessionId>,

    /// Documents pseudonymized successfully
    pub documents_processed: usize,

    /// Documents that failed and were skipped
    pub documents_failed: usize,

    /// Total substitutions over all documents
    pub total_substitutions: usize,

    /// Substitutions by category
    pub substitutions_by_category: BTreeMap<Category, usize>,

    /// Candidates dropped by a validator
    pub validation_failures: usize,

    /// Candidates dropped by the overlap sweep
    pub overlaps_discarded: usize,

    /// Failed documents
    pub failures: Vec<FailedDocument>,

    /// Warnings the operator should review
    pub warnings: Vec<String>,

    /// Whether the session was aborted by a fatal error
    pub aborted: bool,

    /// Processing statistics
    pub stats: ProcessingStats,
}

/// A document that could not be pseudonymized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDocument {
    pub document_id: Option<String>,
    pub message: String,
    pub session_fatal: bool,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Average processing time per document (ms)
    pub avg_processing_time_ms: u64,

    /// Total processing time (ms)
    pub total_processing_time_ms: u64,

    /// Documents with at least one substitution
    pub documents_with_substitutions: usize,

    /// Documents without substitutions
    pub documents_without_substitutions: usize,
}

impl BatchReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            session_id: None,
            documents_processed: 0,
            documents_failed: 0,
            total_substitutions: 0,
            substitutions_by_category: BTreeMap::new(),
            validation_failures: 0,
            overlaps_discarded: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
            aborted: false,
            stats: ProcessingStats::default(),
        }
    }

    /// Create an empty report for a session
    pub fn for_session(session_id: SessionId) -> Self {
        Self {
            session_id: Some(session_id),
            ..Self::new()
        }
    }

    /// Add results from a pseudonymized document
    pub fn add_document(&mut self, document: &PseudonymizedDocument) {
        self.documents_processed += 1;
        self.stats.total_processing_time_ms += document.processing_time_ms;

        let statistics = &document.statistics;
        self.validation_failures += statistics.validation_failures;
        self.overlaps_discarded += statistics.overlaps_discarded;

        if document.has_substitutions() {
            self.stats.documents_with_substitutions += 1;
            self.total_substitutions += document.total_substitutions();
            for (category, count) in &statistics.substitutions {
                *self.substitutions_by_category.entry(*category).or_insert(0) += count;
            }
        } else {
            self.stats.documents_without_substitutions += 1;
        }

        for warning in &document.warnings {
            self.warnings
                .push(format!("{}: {warning}", document.document_id));
        }

        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.documents_processed as u64;
    }

    /// Record a failed document
    pub fn add_failure(&mut self, failure: &DocumentErrorDetail) {
        self.documents_failed += 1;
        self.aborted |= failure.session_fatal;
        self.failures.push(FailedDocument {
            document_id: failure.document_id.clone(),
            message: failure.message.clone(),
            session_fatal: failure.session_fatal,
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Total documents seen
    pub fn total_documents(&self) -> usize {
        self.documents_processed + self.documents_failed
    }

    /// Whether every document was processed
    pub fn is_success(&self) -> bool {
        self.documents_failed == 0 && !self.aborted
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let rule = "───────────────────────────────────────────────────────────────";
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                   PSEUDONYMIZATION REPORT                     \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        let _ = writeln!(output, "{rule}");
        if let Some(session_id) = &self.session_id {
            let _ = writeln!(output, "  Session:                     {session_id}");
        }
        let _ = writeln!(
            output,
            "  Documents Processed:         {}",
            self.documents_processed
        );
        let _ = writeln!(
            output,
            "  Documents Failed:            {}",
            self.documents_failed
        );
        let _ = writeln!(
            output,
            "  Documents with Identifiers:  {}",
            self.stats.documents_with_substitutions
        );
        let _ = writeln!(
            output,
            "  Total Substitutions:         {}",
            self.total_substitutions
        );
        let _ = writeln!(
            output,
            "  Validation Failures:         {}",
            self.validation_failures
        );
        let _ = writeln!(
            output,
            "  Overlaps Discarded:          {}",
            self.overlaps_discarded
        );
        let _ = writeln!(
            output,
            "  Avg Processing Time:         {} ms",
            self.stats.avg_processing_time_ms
        );
        output.push('\n');

        if !self.substitutions_by_category.is_empty() {
            output.push_str("🔍 SUBSTITUTIONS BY CATEGORY\n");
            let _ = writeln!(output, "{rule}");

            let mut categories: Vec<_> = self.substitutions_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1));

            for (category, count) in categories {
                let _ = writeln!(output, "  {:30} {:>5}", category.label(), count);
            }
            output.push('\n');
        }

        if !self.failures.is_empty() {
            output.push_str("❌ FAILED DOCUMENTS\n");
            let _ = writeln!(output, "{rule}");
            for failure in &self.failures {
                let id = failure.document_id.as_deref().unwrap_or("<unknown>");
                let fatal = if failure.session_fatal {
                    " (session aborted)"
                } else {
                    ""
                };
                let _ = writeln!(output, "  • {id}: {}{fatal}", failure.message);
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            let _ = writeln!(output, "{rule}");
            for warning in &self.warnings {
                let _ = writeln!(output, "  • {warning}");
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> Result<()> {
        std::fs::write(path, self.format_json()?)?;
        Ok(())
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentId;
    use crate::pseudonymization::models::{AuditEntry, DocumentStatistics, RegistrySnapshot};

    fn document(id: &str, substitutions: &[(Category, &str)]) -> PseudonymizedDocument {
        let mut statistics = DocumentStatistics::default();
        for (category, _) in substitutions {
            *statistics.substitutions.entry(*category).or_insert(0) += 1;
        }
        statistics.validation_failures = 1;

        PseudonymizedDocument {
            document_id: DocumentId::new(id).unwrap(),
            pseudonymized_text: String::new(),
            audit_record: substitutions
                .iter()
                .map(|(category, placeholder)| AuditEntry {
                    category: *category,
                    placeholder: placeholder.to_string(),
                    span_length: 5,
                })
                .collect(),
            label_registry_snapshot: RegistrySnapshot::default(),
            anchor: None,
            statistics,
            warnings: vec![],
            processing_time_ms: 10,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_report_creation() {
        let report = BatchReport::new();
        assert_eq!(report.total_documents(), 0);
        assert!(report.substitutions_by_category.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_add_documents() {
        let mut report = BatchReport::new();
        report.add_document(&document(
            "a.txt",
            &[(Category::Naam, "[NAAM_1]"), (Category::Bsn, "[BSN]")],
        ));
        let mut empty = document("b.txt", &[]);
        empty.processing_time_ms = 20;
        empty.warnings.push("No incident date found".to_string());
        report.add_document(&empty);

        assert_eq!(report.documents_processed, 2);
        assert_eq!(report.total_substitutions, 2);
        assert_eq!(report.substitutions_by_category.get(&Category::Naam), Some(&1));
        assert_eq!(report.validation_failures, 2);
        assert_eq!(report.stats.documents_with_substitutions, 1);
        assert_eq!(report.stats.documents_without_substitutions, 1);
        assert_eq!(report.stats.avg_processing_time_ms, 15);
        assert_eq!(report.warnings, vec!["b.txt: No incident date found"]);
    }

    #[test]
    fn test_failures_mark_report() {
        let mut report = BatchReport::new();
        report.add_failure(&DocumentErrorDetail::new("timeout").with_document_id("c.txt"));
        assert!(!report.is_success());
        assert!(!report.aborted);

        report.add_failure(&DocumentErrorDetail::new("registry").session_fatal());
        assert!(report.aborted);
        assert_eq!(report.documents_failed, 2);
    }

    #[test]
    fn test_format_console() {
        let mut report = BatchReport::for_session(SessionId::new());
        report.add_document(&document("a.txt", &[(Category::Plaats, "[PLAATS_1]")]));
        report.add_failure(&DocumentErrorDetail::new("boom").with_document_id("x.txt"));

        let output = report.format_console();
        assert!(output.contains("PSEUDONYMIZATION REPORT"));
        assert!(output.contains("Documents Processed:         1"));
        assert!(output.contains("PLAATS"));
        assert!(output.contains("x.txt: boom"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = BatchReport::new();
        report.add_document(&document("a.txt", &[(Category::Email, "[EMAIL]")]));
        report.write_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["documents_processed"], 1);
        assert_eq!(json["substitutions_by_category"]["EMAIL"], 1);
    }
}
