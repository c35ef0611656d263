//! Audit logger for pseudonymization sessions

use crate::domain::context::ResultExt;
use crate::domain::{KineticError, Result, SessionId};
use crate::pseudonymization::models::PseudonymizedDocument;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Audit log entry, one per document
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    session_id: String,
    document_id: &'a str,
    substitutions_count: usize,
    processing_time_ms: u64,
    substitutions: Vec<AuditSubstitution<'a>>,
}

/// One substitution (with hashed original text)
#[derive(Debug, Serialize)]
struct AuditSubstitution<'a> {
    category: &'static str,
    placeholder: &'a str,
    span_length: usize,
    /// SHA-256 of the session id and the original text
    value_hash: String,
}

/// Audit logger for pseudonymized documents
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    KineticError::Io(format!(
                        "Failed to create audit log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a pseudonymized document.
    ///
    /// `originals` holds the replaced text of each audit entry, in the same
    /// order; it is only used to compute the hashes.
    pub fn log_document(
        &self,
        session_id: SessionId,
        document: &PseudonymizedDocument,
        originals: &[&str],
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if originals.len() != document.audit_record.len() {
            return Err(KineticError::Validation(format!(
                "{} originals for {} audit entries",
                originals.len(),
                document.audit_record.len()
            )));
        }

        let entry = AuditLogEntry {
            timestamp: document.timestamp.to_rfc3339(),
            session_id: session_id.to_string(),
            document_id: document.document_id.as_str(),
            substitutions_count: document.audit_record.len(),
            processing_time_ms: document.processing_time_ms,
            substitutions: document
                .audit_record
                .iter()
                .zip(originals)
                .map(|(audit, original)| AuditSubstitution {
                    category: audit.category.label(),
                    placeholder: &audit.placeholder,
                    span_length: audit.span_length,
                    value_hash: hash_original(session_id, original),
                })
                .collect(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                KineticError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        if self.json_format {
            let json_line = serde_json::to_string(entry)?;
            writeln!(file, "{json_line}")
                .with_context(|| format!("Failed to append to {}", self.log_path.display()))?;
        } else {
            writeln!(
                file,
                "[{}] Session: {} | Document: {} | Substitutions: {} | Time: {}ms",
                entry.timestamp,
                entry.session_id,
                entry.document_id,
                entry.substitutions_count,
                entry.processing_time_ms
            )
            .with_context(|| format!("Failed to append to {}", self.log_path.display()))?;
        }

        Ok(())
    }
}

/// Hash an original value, salted with the session id so hashes cannot be
/// joined across sessions
fn hash_original(session_id: SessionId, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_uuid().as_bytes());
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}
