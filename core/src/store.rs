//! Boundary between the engine and whatever backs the host and signal records.

use std::error::Error as StdError;
use thiserror::Error;

use crate::model::{HostInventoryRecord, SignalRecord, UnifiedHostRecord};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reading or writing the record store. Always fatal to the current run or request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed row in {table}: {reason}")]
    Schema { table: &'static str, reason: String },

    #[error("record store error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Which slice of the unified snapshot a view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostScope {
    All,
    Classification(String),
    Purpose { classification: String, purpose: String },
}

/// Flat tabular access to inventory, signals and the unified snapshot.
///
/// Signal reads must return rows in insertion order so that the last entry for a
/// repeated address is the most recently inserted one.
pub trait RecordStore {
    fn fetch_all_hosts(&self) -> Result<Vec<HostInventoryRecord>>;
    fn fetch_antivirus_signals(&self) -> Result<Vec<SignalRecord>>;
    fn fetch_log_signals(&self) -> Result<Vec<SignalRecord>>;
    /// Replace the whole snapshot. Readers never observe a partially written snapshot.
    fn replace_unified_hosts(&mut self, hosts: &[UnifiedHostRecord]) -> Result<()>;
    /// Snapshot rows in the scope, in insertion order.
    fn fetch_unified_hosts(&self, scope: &HostScope) -> Result<Vec<UnifiedHostRecord>>;
}
