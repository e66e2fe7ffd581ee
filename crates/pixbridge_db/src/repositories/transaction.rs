//! Row layout and column codecs for the `transactions` table.
//!
//! The `Any` driver cannot decode `DateTime<Utc>`, so timestamps are stored
//! as fixed-width RFC 3339 text in UTC. That form sorts lexicographically in
//! the same order as the instants it encodes, which is what the recency
//! filter and the newest-first ordering rely on.

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use pixbridge_common::{StoredTransaction, TransactionStatus};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};

pub const TRANSACTIONS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        txid TEXT NOT NULL UNIQUE,
        internal_id TEXT NOT NULL,
        tax_id TEXT,
        status TEXT NOT NULL,
        callback_url TEXT,
        amount TEXT NOT NULL,
        pix_copy_paste TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

pub(crate) const TRANSACTIONS_STATUS_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_status_created_at
    ON transactions (status, created_at)
"#;

pub(crate) const SELECT_COLUMNS: &str = "id, txid, internal_id, tax_id, status, callback_url, \
     amount, pix_copy_paste, created_at, updated_at";

/// Encode an instant the way the `created_at`/`updated_at` columns expect.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("invalid timestamp '{}': {}", raw, e)))
}

fn column<T>(row: &AnyRow, name: &str) -> Result<T, DbError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    row.try_get(name)
        .map_err(|e| DbError::DecodeError(format!("column '{}': {}", name, e)))
}

/// Decode a nullable TEXT column.
///
/// The `Any` driver reports a NULL value as the NULL type, which does not
/// decode into `Option<String>`, so NULL is checked on the raw value first.
fn optional_column(row: &AnyRow, name: &str) -> Result<Option<String>, DbError> {
    let raw = row
        .try_get_raw(name)
        .map_err(|e| DbError::DecodeError(format!("column '{}': {}", name, e)))?;
    if raw.is_null() {
        return Ok(None);
    }
    column::<String>(row, name).map(Some)
}

pub(crate) fn transaction_from_row(row: &AnyRow) -> Result<StoredTransaction, DbError> {
    let status: String = column(row, "status")?;
    let status = status
        .parse::<TransactionStatus>()
        .map_err(DbError::DecodeError)?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    Ok(StoredTransaction {
        id: column(row, "id")?,
        txid: column(row, "txid")?,
        internal_id: column(row, "internal_id")?,
        tax_id: optional_column(row, "tax_id")?,
        status,
        callback_url: optional_column(row, "callback_url")?,
        amount: column(row, "amount")?,
        pix_copy_paste: optional_column(row, "pix_copy_paste")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
