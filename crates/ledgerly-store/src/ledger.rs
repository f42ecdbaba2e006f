//! Processing ledger and run lease
//!
//! The ledger remembers which (watch, file) pairs finished processing so a
//! rescan never reprocesses them. It lives in its own database, separate
//! from the transaction store, and is written only by the watch scanner.
//!
//! The same database carries a single-row `scan_lease` table. A scan takes
//! the lease before touching any file; a lease older than the stale
//! threshold is assumed abandoned and taken over.

use crate::{parse_timestamp, StoreError, BUSY_TIMEOUT};
use chrono::{DateTime, Duration, Utc};
use ledgerly_domain::traits::ProcessingLedger;
use ledgerly_domain::LedgerRecord;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use std::path::Path;
use tracing::{debug, info, warn};

/// Age after which a lease is considered abandoned
pub const DEFAULT_LEASE_STALE_AFTER_HOURS: i64 = 6;

/// SQLite-based implementation of ProcessingLedger
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (creating if needed) the ledger database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(include_str!("ledger_schema.sql"))?;
        Ok(Self { conn })
    }

    /// Open the ledger without ever writing to disk
    ///
    /// A missing database means nothing has been processed yet: an empty
    /// in-memory ledger is returned and no file is created. Writes through a
    /// read-only ledger fail.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No ledger at {}, treating as empty", path.display());
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(include_str!("ledger_schema.sql"))?;
            return Ok(Self { conn });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Records for one watch, oldest first
    pub fn list_processed(&self, watch_id: &str) -> Result<Vec<LedgerRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT watch_id, file_path, processed_at FROM processing_ledger
             WHERE watch_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![watch_id], |row| {
                Ok(LedgerRecord {
                    watch_id: row.get(0)?,
                    file_path: row.get(1)?,
                    processed_at: parse_timestamp(&row.get::<_, String>(2)?, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Take the run lease for `holder`, failing if a live lease exists
    pub fn acquire_lease(&mut self, holder: &str, stale_after: Duration) -> Result<(), StoreError> {
        self.acquire_lease_at(holder, Utc::now(), stale_after)
    }

    /// Same as [`acquire_lease`](Self::acquire_lease) with an explicit clock
    pub fn acquire_lease_at(
        &mut self,
        holder: &str,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<(), StoreError> {
        // IMMEDIATE takes the write lock up front so two scans cannot both
        // observe an empty lease table
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<(String, String)> = tx
            .query_row(
                "SELECT holder, acquired_at FROM scan_lease WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if let Some((current_holder, acquired_at)) = current {
            if current_holder != holder {
                match DateTime::parse_from_rfc3339(&acquired_at) {
                    Ok(t) if now - t.with_timezone(&Utc) < stale_after => {
                        return Err(StoreError::LeaseHeld {
                            holder: current_holder,
                            acquired_at,
                        });
                    }
                    Ok(_) => warn!(
                        "Taking over stale scan lease from {} (acquired {})",
                        current_holder, acquired_at
                    ),
                    Err(_) => warn!(
                        "Taking over scan lease with unreadable timestamp from {}",
                        current_holder
                    ),
                }
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO scan_lease (id, holder, acquired_at) VALUES (1, ?1, ?2)",
            params![holder, now.to_rfc3339()],
        )?;
        tx.commit()?;

        info!("Scan lease acquired by {}", holder);
        Ok(())
    }

    /// Release the lease if `holder` still owns it
    pub fn release_lease(&mut self, holder: &str) -> Result<(), StoreError> {
        let released = self
            .conn
            .execute("DELETE FROM scan_lease WHERE id = 1 AND holder = ?1", params![holder])?;
        if released == 0 {
            warn!("Scan lease was no longer held by {}", holder);
        }
        Ok(())
    }
}

impl ProcessingLedger for SqliteLedger {
    type Error = StoreError;

    fn is_processed(&self, watch_id: &str, file_path: &str) -> Result<bool, Self::Error> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM processing_ledger WHERE watch_id = ?1 AND file_path = ?2",
                params![watch_id, file_path],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn record_processed(&mut self, watch_id: &str, file_path: &str) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO processing_ledger (watch_id, file_path, processed_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (watch_id, file_path) DO NOTHING",
            params![watch_id, file_path, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
