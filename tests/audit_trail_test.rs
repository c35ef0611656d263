//! Integration tests for the pseudonymization audit trail

use kinetic::config::AuditConfig;
use kinetic::pseudonymization::{PseudonymizationConfig, PseudonymizationEngine};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn engine_with_audit(log_path: &Path, json_format: bool) -> std::sync::Arc<PseudonymizationEngine> {
    let config = PseudonymizationConfig {
        audit: AuditConfig {
            enabled: true,
            log_path: log_path.to_path_buf(),
            json_format,
        },
        ..Default::default()
    };
    PseudonymizationEngine::new(config).unwrap()
}

#[test]
fn test_audit_line_per_document() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit").join("pseudonymization.log");
    let session = engine_with_audit(&log_path, true).new_session();

    session
        .process("Jan van der Berg bezocht Amsterdam UMC op 15 januari 2024. BSN: 123456782.")
        .unwrap();
    session.process("geen bijzonderheden").unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["session_id"], session.id().to_string());
    assert_eq!(first["substitutions_count"], 4);
    let substitutions = first["substitutions"].as_array().unwrap();
    assert_eq!(substitutions[0]["category"], "NAAM");
    assert_eq!(substitutions[0]["placeholder"], "[NAAM_1]");
    assert_eq!(substitutions[3]["category"], "BSN");

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["substitutions_count"], 0);
}

#[test]
fn test_audit_log_holds_no_identifying_text() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit.log");
    let session = engine_with_audit(&log_path, true).new_session();

    session
        .process("Piet Pietersen, BSN 123456782, mail p.pietersen@example.nl")
        .unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    for original in ["Piet Pietersen", "123456782", "p.pietersen@example.nl"] {
        assert!(!content.contains(original));
    }
}

#[test]
fn test_same_value_hashes_equal_within_session() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit.log");
    let session = engine_with_audit(&log_path, true).new_session();

    session.process("Karel Appel").unwrap();
    session.process("Karel Appel").unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let hashes: Vec<String> = content
        .lines()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["substitutions"][0]["value_hash"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();

    assert_eq!(hashes.len(), 2);
    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn test_plain_text_audit_format() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit.log");
    let session = engine_with_audit(&log_path, false).new_session();

    session.process("Karel Appel").unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("Substitutions: 1"));
    assert!(content.contains(&format!("Session: {}", session.id())));
}

#[test]
fn test_disabled_audit_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit.log");
    let config = PseudonymizationConfig {
        audit: AuditConfig {
            enabled: false,
            log_path: log_path.clone(),
            json_format: true,
        },
        ..Default::default()
    };

    PseudonymizationEngine::new(config)
        .unwrap()
        .new_session()
        .process("Karel Appel")
        .unwrap();

    assert!(!log_path.exists());
}
