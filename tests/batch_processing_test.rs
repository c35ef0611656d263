//! Integration tests for batch processing within one session

use kinetic::domain::DocumentId;
use kinetic::pseudonymization::{new_session, Category, Document};
use std::time::Duration;
use tempfile::TempDir;

fn document(id: &str, text: &str) -> Document {
    Document::with_id(DocumentId::new(id).unwrap(), text)
}

#[tokio::test]
async fn test_batch_shares_registry() {
    let session = new_session().unwrap();
    let documents = vec![
        document("intake.txt", "Verwezen door Piet Pietersen, opgenomen 01-03-2024."),
        document("ontslag.txt", "Piet Pietersen ontslagen 08-03-2024, controle 22-03-2024."),
        document("brief.txt", "Collega Klaas Vaak, betreft Piet Pietersen."),
    ];

    let outcome = session
        .process_batch(documents, Some(Duration::from_secs(30)))
        .await;

    assert!(outcome.report.is_success());
    let texts: Vec<&str> = outcome
        .documents
        .iter()
        .map(|d| d.pseudonymized_text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Verwezen door [NAAM_1], opgenomen [T+0].",
            "[NAAM_1] ontslagen [T+0], controle [T+14].",
            "Collega [NAAM_2], betreft [NAAM_1].",
        ]
    );
}

#[tokio::test]
async fn test_batch_report_totals() {
    let session = new_session().unwrap();
    let documents = vec![
        document("a.txt", "Karel Appel, BSN 123456782"),
        document("b.txt", "factuurnummer 123456789"),
        document("c.txt", "mail k.appel@example.nl of bel 06-12345678"),
    ];

    let outcome = session.process_batch(documents, None).await;
    let report = &outcome.report;

    assert_eq!(report.session_id, Some(session.id()));
    assert_eq!(report.documents_processed, 3);
    assert_eq!(report.documents_failed, 0);
    assert_eq!(report.total_substitutions, 4);
    assert_eq!(report.substitutions_by_category.get(&Category::Naam), Some(&1));
    assert_eq!(report.substitutions_by_category.get(&Category::Bsn), Some(&1));
    assert_eq!(report.validation_failures, 1);
    assert_eq!(report.stats.documents_with_substitutions, 2);
    assert_eq!(report.stats.documents_without_substitutions, 1);
}

#[tokio::test]
async fn test_batch_report_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    let session = new_session().unwrap();

    let outcome = session
        .process_batch(vec![document("a.txt", "Karel Appel")], None)
        .await;
    outcome.report.write_to_file(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["documents_processed"], 1);
    assert_eq!(json["aborted"], false);
    assert!(!std::fs::read_to_string(&path).unwrap().contains("Karel Appel"));
}

#[tokio::test]
async fn test_concurrent_tasks_assign_one_number() {
    let session = new_session().unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            session
                .process("Opname van Karel Appel in Utrecht.")
                .map(|d| d.pseudonymized_text)
        }));
    }

    for handle in handles {
        let text = handle.await.unwrap().unwrap();
        assert_eq!(text, "Opname van [NAAM_1] in [PLAATS_1].");
    }
    assert_eq!(session.snapshot().unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_batch() {
    let session = new_session().unwrap();
    let outcome = session.process_batch(Vec::new(), None).await;

    assert!(outcome.documents.is_empty());
    assert_eq!(outcome.report.total_documents(), 0);
    assert!(!outcome.aborted());
}
