//! Integration tests for the document processor
//!
//! Statements are plain-text exports (pages split by form feed) so that
//! page extraction is exercised without a PDF fixture.

use ledgerly_domain::traits::{DocumentProcessor, InsertSummary, TransactionStore};
use ledgerly_domain::{ProcessOutcome, ProcessingLogEntry, ProcessingStatus, TransactionRecord};
use ledgerly_extractor::ExtractorConfig;
use ledgerly_llm::MockProvider;
use ledgerly_processor::Processor;
use ledgerly_store::SqliteStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reply for one page: `rows` are (day, description, amount, type)
fn page_reply(envelope: bool, rows: &[(u32, &str, f64, &str)]) -> String {
    let txs: Vec<String> = rows
        .iter()
        .map(|(day, desc, amount, kind)| {
            format!(
                r#"{{"transaction_date": "2025-01-{:02}", "post_date": null, "description": "{}", "amount": {}, "transaction_type": "{}", "balance": null}}"#,
                day, desc, amount, kind
            )
        })
        .collect();

    let header = if envelope {
        r#""account_name": "Everyday Checking", "account_last4": "4321", "statement_date": "2025-01-31","#
    } else {
        r#""account_name": "", "account_last4": "", "statement_date": null,"#
    };
    format!("{{{} \"transactions\": [{}]}}", header, txs.join(", "))
}

fn write_statement(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, pages.join("\u{c}")).unwrap();
    path
}

fn processor(dir: &TempDir, llm: MockProvider) -> Processor<MockProvider, SqliteStore> {
    let store = SqliteStore::new(dir.path().join("tx.db")).unwrap();
    Processor::new(llm, store, ExtractorConfig::default())
}

#[test]
fn test_happy_path_two_pages() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "stmt1.txt", &["MARKER-A1", "MARKER-A2"]);

    let mut llm = MockProvider::default();
    llm.add_response(
        "MARKER-A1",
        page_reply(
            true,
            &[
                (2, "COFFEE", 4.5, "debit"),
                (3, "GROCERY", 60.25, "debit"),
                (5, "PAYROLL", 2000.0, "credit"),
                (7, "RENT", 1200.0, "debit"),
                (8, "UTILITY", 80.0, "debit"),
                (9, "ATM", 40.0, "debit"),
            ],
        ),
    );
    llm.add_response(
        "MARKER-A2",
        page_reply(
            false,
            &[
                (12, "BOOKS", 22.0, "debit"),
                (15, "REFUND", 22.0, "credit"),
                (20, "GAS", 35.1, "debit"),
                (28, "INTEREST", 0.42, "credit"),
            ],
        ),
    );

    let mut p = processor(&dir, llm);
    let outcome = p.process(&file);
    assert_eq!(outcome, ProcessOutcome::Success { inserted: 10, skipped: 0 });

    let stored = p.store().list_transactions(Some("4321")).unwrap();
    assert_eq!(stored.len(), 10);
    assert!(stored.iter().all(|r| r.source_file == "stmt1.txt"));
    assert!(stored.iter().find(|r| r.description == "RENT").unwrap().amount < 0.0);

    let log = p.store().recent_log_entries(10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, ProcessingStatus::Success);
    assert_eq!(log[0].transactions_inserted, 10);
    assert_eq!(log[0].transactions_skipped, 0);
    assert_eq!(log[0].account_name, "Everyday Checking");
}

#[test]
fn test_cross_page_duplicate_never_reaches_store() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "dup.txt", &["MARKER-B1", "MARKER-B2"]);

    let mut llm = MockProvider::default();
    llm.add_response(
        "MARKER-B1",
        page_reply(true, &[(2, "COFFEE", 4.5, "debit"), (30, "CARRIED OVER", 9.99, "debit")]),
    );
    llm.add_response(
        "MARKER-B2",
        page_reply(false, &[(30, "CARRIED OVER", 9.99, "debit"), (31, "LAST", 1.0, "debit")]),
    );

    let mut p = processor(&dir, llm);
    let outcome = p.process(&file);
    assert_eq!(outcome, ProcessOutcome::Success { inserted: 3, skipped: 0 });

    let log = p.store().recent_log_entries(1).unwrap();
    assert_eq!(log[0].transactions_skipped, 0);
}

#[test]
fn test_reprocessing_is_all_skips() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "again.txt", &["MARKER-R1"]);
    let llm = MockProvider::new(page_reply(true, &[(4, "GYM", 30.0, "debit"), (6, "BONUS", 50.0, "credit")]));

    let mut p = processor(&dir, llm);
    assert_eq!(p.process(&file), ProcessOutcome::Success { inserted: 2, skipped: 0 });
    assert_eq!(p.process(&file), ProcessOutcome::Success { inserted: 0, skipped: 2 });
    assert_eq!(p.store().list_transactions(None).unwrap().len(), 2);
    assert_eq!(p.store().recent_log_entries(10).unwrap().len(), 2);
}

#[test]
fn test_unreachable_inference_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "down.txt", &["page one", "page two"]);

    let llm = MockProvider::new(page_reply(true, &[(4, "GYM", 30.0, "debit")]));
    llm.set_reachable(false);

    let mut p = processor(&dir, llm);
    let outcome = p.process(&file);
    assert!(matches!(outcome, ProcessOutcome::ParseError { .. }));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(p.llm().call_count(), 0);

    assert!(p.store().list_transactions(None).unwrap().is_empty());
    let log = p.store().recent_log_entries(10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, ProcessingStatus::ParseError);
    assert!(!log[0].error_message.is_empty());
}

#[test]
fn test_one_bad_page_is_dropped() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "partial.txt", &["MARKER-P1", "MARKER-P2"]);

    let mut llm = MockProvider::default();
    llm.add_response("MARKER-P1", page_reply(true, &[(3, "TAXI", 18.0, "debit")]));
    llm.add_response("MARKER-P2", "this is not json");

    let mut p = processor(&dir, llm);
    assert_eq!(p.process(&file), ProcessOutcome::Success { inserted: 1, skipped: 0 });
}

#[test]
fn test_non_finite_amount_is_never_counted_as_skipped() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "nan.txt", &["MARKER-N1"]);
    let reply = r#"{"account_name": "Everyday Checking", "account_last4": "4321",
        "statement_date": "2025-01-31", "transactions": [
          {"transaction_date": "2025-01-02", "description": "COFFEE", "amount": 4.5,
           "transaction_type": "debit"},
          {"transaction_date": "2025-01-03", "description": "GARBLED", "amount": "(NaN)",
           "transaction_type": "debit"}]}"#;
    let llm = MockProvider::new(reply);

    let mut p = processor(&dir, llm);
    assert!(matches!(p.process(&file), ProcessOutcome::ParseError { .. }));
    assert!(p.store().list_transactions(None).unwrap().is_empty());

    let log = p.store().recent_log_entries(10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, ProcessingStatus::ParseError);
    assert_eq!(log[0].transactions_skipped, 0);
}

#[test]
fn test_validation_failure_logs_known_envelope() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "bad.txt", &["MARKER-V1"]);
    let llm = MockProvider::new(page_reply(true, &[(3, "MYSTERY", 18.0, "transfer")]));

    let mut p = processor(&dir, llm);
    let outcome = p.process(&file);
    let ProcessOutcome::ParseError { reason } = outcome else {
        panic!("expected parse error");
    };
    assert!(reason.contains("invalid type"));

    let log = p.store().recent_log_entries(1).unwrap();
    assert_eq!(log[0].status, ProcessingStatus::ParseError);
    assert_eq!(log[0].account_name, "Everyday Checking");
}

#[test]
fn test_image_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("scan.png");
    fs::write(&file, b"\x89PNG").unwrap();

    let mut p = processor(&dir, MockProvider::default());
    let ProcessOutcome::ParseError { reason } = p.process(&file) else {
        panic!("expected parse error");
    };
    assert!(reason.contains("Image ingestion not supported"));
}

/// Store whose writes always fail, recording audit attempts
#[derive(Default)]
struct BrokenStore {
    audit: Vec<ProcessingLogEntry>,
}

impl TransactionStore for BrokenStore {
    type Error = String;

    fn insert_transactions(
        &mut self,
        _: &[TransactionRecord],
        _: &ProcessingLogEntry,
    ) -> Result<InsertSummary, String> {
        Err("disk I/O error".to_string())
    }

    fn append_log(&mut self, entry: &ProcessingLogEntry) -> Result<(), String> {
        self.audit.push(entry.clone());
        Ok(())
    }
}

#[test]
fn test_store_failure_is_store_error_with_db_error_audit() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(dir.path(), "s.txt", &["MARKER-S1"]);
    let llm = MockProvider::new(page_reply(true, &[(3, "TAXI", 18.0, "debit")]));

    let mut p = Processor::new(llm, BrokenStore::default(), ExtractorConfig::default());
    let outcome = p.process(&file);
    assert_eq!(
        outcome,
        ProcessOutcome::StoreError {
            reason: "disk I/O error".to_string()
        }
    );
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(p.store().audit.len(), 1);
    assert_eq!(p.store().audit[0].status, ProcessingStatus::DbError);
}
