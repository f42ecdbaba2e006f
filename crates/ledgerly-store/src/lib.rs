//! Ledgerly Storage Layer
//!
//! SQLite implementations of the storage traits from `ledgerly-domain`.
//!
//! # Databases
//!
//! - [`SqliteStore`]: the transaction store and its append-only processing
//!   log, owned by the document processor
//! - [`SqliteLedger`]: the processing ledger and run lease, owned by the
//!   watch scanner
//!
//! # Examples
//!
//! ```no_run
//! use ledgerly_store::SqliteStore;
//!
//! let store = SqliteStore::new("transactions.db").unwrap();
//! // Store is now ready for statement batches
//! ```

#![warn(missing_docs)]

pub mod ledger;

use chrono::{DateTime, NaiveDate, Utc};
use ledgerly_domain::traits::{InsertSummary, TransactionStore};
use ledgerly_domain::{
    amount_to_cents, ProcessingLogEntry, ProcessingStatus, TransactionRecord, TransactionType,
};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use ledger::SqliteLedger;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Another scan holds a live run lease
    #[error("Scan lease held by {holder} since {acquired_at}")]
    LeaseHeld {
        /// Identity of the current holder
        holder: String,
        /// When the holder acquired the lease (RFC 3339)
        acquired_at: String,
    },
}

/// SQLite-based implementation of TransactionStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the transaction store at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// List stored transactions ordered by date, optionally for one account
    pub fn list_transactions(
        &self,
        account_last4: Option<&str>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT account_name, account_last4, transaction_date, post_date, description,
                    amount, transaction_type, balance, statement_date, source_file
             FROM transactions",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(last4) = account_last4 {
            sql.push_str(" WHERE account_last4 = ?");
            params.push(Box::new(last4.to_string()));
        }
        sql.push_str(" ORDER BY transaction_date, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(&param_refs[..], |row| {
                let type_text: String = row.get(6)?;
                let transaction_type = TransactionType::parse(&type_text).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        6,
                        rusqlite::types::Type::Text,
                        Box::new(StoreError::InvalidData(format!(
                            "Unknown transaction type: {}",
                            type_text
                        ))),
                    )
                })?;
                let post_date: Option<String> = row.get(3)?;

                Ok(TransactionRecord {
                    account_name: row.get(0)?,
                    account_last4: row.get(1)?,
                    transaction_date: parse_date(&row.get::<_, String>(2)?, 2)?,
                    post_date: post_date.map(|d| parse_date(&d, 3)).transpose()?,
                    description: row.get(4)?,
                    amount: row.get(5)?,
                    transaction_type,
                    balance: row.get(7)?,
                    statement_date: parse_date(&row.get::<_, String>(8)?, 8)?,
                    source_file: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Most recent audit log entries, newest first
    pub fn recent_log_entries(&self, limit: usize) -> Result<Vec<ProcessingLogEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT source_file, statement_date, account_name, transactions_inserted,
                    transactions_skipped, status, error_message, processed_at
             FROM processing_log ORDER BY id DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                let status_text: String = row.get(5)?;
                let status = ProcessingStatus::parse(&status_text).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(StoreError::InvalidData(format!(
                            "Unknown status: {}",
                            status_text
                        ))),
                    )
                })?;
                let statement_date: Option<String> = row.get(1)?;

                Ok(ProcessingLogEntry {
                    source_file: row.get(0)?,
                    statement_date: statement_date.map(|d| parse_date(&d, 1)).transpose()?,
                    account_name: row.get(2)?,
                    transactions_inserted: row.get::<_, i64>(3)? as usize,
                    transactions_skipped: row.get::<_, i64>(4)? as usize,
                    status,
                    error_message: row.get(6)?,
                    processed_at: parse_timestamp(&row.get::<_, String>(7)?, 7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl TransactionStore for SqliteStore {
    type Error = StoreError;

    fn insert_transactions(
        &mut self,
        records: &[TransactionRecord],
        entry: &ProcessingLogEntry,
    ) -> Result<InsertSummary, Self::Error> {
        let created_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut summary = InsertSummary::default();

        {
            // Only a natural-key collision is tolerated; any other constraint
            // failure aborts the batch
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (
                    account_name, account_last4, transaction_date, post_date, description,
                    amount, amount_cents, transaction_type, balance, statement_date,
                    source_file, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT (account_last4, transaction_date, description, amount_cents)
                 DO NOTHING",
            )?;

            for record in records {
                let changed = stmt.execute(params![
                    &record.account_name,
                    &record.account_last4,
                    record.transaction_date.format(DATE_FORMAT).to_string(),
                    record.post_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    &record.description,
                    record.amount,
                    amount_to_cents(record.amount),
                    record.transaction_type.as_str(),
                    record.balance,
                    record.statement_date.format(DATE_FORMAT).to_string(),
                    &record.source_file,
                    &created_at,
                ])?;

                if changed == 0 {
                    summary.skipped += 1;
                } else {
                    summary.inserted += 1;
                }
            }
        }

        let mut entry = entry.clone();
        entry.transactions_inserted = summary.inserted;
        entry.transactions_skipped = summary.skipped;
        insert_log(&tx, &entry)?;

        tx.commit()?;
        debug!(
            "Stored batch: inserted={} skipped={}",
            summary.inserted, summary.skipped
        );
        Ok(summary)
    }

    fn append_log(&mut self, entry: &ProcessingLogEntry) -> Result<(), Self::Error> {
        insert_log(&self.conn, entry)
    }
}

fn insert_log(conn: &Connection, entry: &ProcessingLogEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO processing_log (
            source_file, statement_date, account_name, transactions_inserted,
            transactions_skipped, status, error_message, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &entry.source_file,
            entry.statement_date.map(|d| d.format(DATE_FORMAT).to_string()),
            &entry.account_name,
            entry.transactions_inserted as i64,
            entry.transactions_skipped as i64,
            entry.status.as_str(),
            &entry.error_message,
            entry.processed_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn parse_date(text: &str, column: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_timestamp(text: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
