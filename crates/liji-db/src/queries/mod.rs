//! Database query modules.
//!
//! This module organizes all database operations into logical groups:
//! - records: gift record listing and batch save
//! - giftbooks: giftbook listing and batch save (with line items)
//! - settings: key/value settings and the shared password

pub mod giftbooks;
pub mod records;
pub mod settings;

use chrono::{DateTime, NaiveDateTime, Utc};
use liji_common::Error;
use rusqlite::types::Type;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Convert a rusqlite error into the common error type.
pub(crate) fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// `CURRENT_TIMESTAMP` format, found in rows written by older deployments.
const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Read a timestamp column: RFC 3339, or SQLite's `CURRENT_TIMESTAMP` text (UTC).
pub(crate) fn timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP)
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

/// Begin a write transaction up front so concurrent batch saves queue on the
/// busy timeout instead of failing when they upgrade from a read lock.
pub(crate) fn begin_write(conn: &Connection) -> liji_common::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(db_err)
}
