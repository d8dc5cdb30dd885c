//! Typed row mapping. Untyped rows never leave this crate.

use hostwatch_core::{HostInventoryRecord, SignalRecord, StoreError, UnifiedHostRecord};
use rusqlite::types::ValueRef;
use rusqlite::Row;

pub(crate) const HOSTS: &str = "hosts";
pub(crate) const ANTIVIRUS: &str = "antivirus_hosts";
pub(crate) const LOGSERVER: &str = "logserver_hosts";
pub(crate) const DASHBOARD: &str = "dashboard_hosts";

/// Lock contention and open failures mean the store is unavailable; the rest are driver failures.
pub(crate) fn store_error(err: rusqlite::Error) -> StoreError {
    let unavailable = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, _) if matches!(
            e.code,
            rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        )
    );
    if unavailable {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::backend(err)
    }
}

/// Conversion failures are schema problems.
pub(crate) fn row_error(table: &'static str, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::InvalidColumnType(idx, name, ty) => StoreError::Schema {
            table,
            reason: format!("column {idx} ({name}) has unexpected type {ty}"),
        },
        rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => StoreError::Schema {
            table,
            reason: format!("column {idx} ({ty}) could not be converted: {source}"),
        },
        other => store_error(other),
    }
}

pub(crate) fn inventory_from_row(r: &Row<'_>) -> rusqlite::Result<HostInventoryRecord> {
    Ok(HostInventoryRecord {
        address: r.get(0)?,
        hostname: r.get(1)?,
        purpose: r.get(2)?,
        classification: r.get(3)?,
    })
}

pub(crate) fn signal_from_row(r: &Row<'_>) -> rusqlite::Result<SignalRecord> {
    Ok(SignalRecord { address: r.get(0)?, timestamp: timestamp_text(r, 1)? })
}

/// Timestamp columns are read leniently: a non-text value is kept as text so the
/// evaluator can reject it, instead of failing the whole read.
fn timestamp_text(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(b) | ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

pub(crate) fn unified_from_row(r: &Row<'_>) -> rusqlite::Result<UnifiedHostRecord> {
    Ok(UnifiedHostRecord {
        address: r.get(0)?,
        hostname: r.get(1)?,
        purpose: r.get(2)?,
        classification: r.get(3)?,
        antivirus_last_updated: timestamp_text(r, 4)?,
        log_last_received: timestamp_text(r, 5)?,
    })
}
