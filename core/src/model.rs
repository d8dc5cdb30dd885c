use serde::{Deserialize, Serialize};
use std::fmt;
use time::PrimitiveDateTime;

use crate::timestamp::parse_timestamp;

/// Identity record for one host, as provisioned in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInventoryRecord {
    #[serde(alias = "ip_address")]
    pub address: String,
    pub hostname: String,
    pub purpose: String,
    pub classification: String,
}

/// One freshness observation (antivirus update or log receipt) for an address.
///
/// The timestamp is kept in its stored text form; interpretation happens in the
/// evaluator so that a malformed value degrades to "not fresh" instead of failing
/// the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(alias = "ip_address")]
    pub address: String,
    #[serde(alias = "last_updated_datetime", alias = "last_log_received_datetime")]
    pub timestamp: Option<String>,
}

impl SignalRecord {
    pub fn new(address: impl Into<String>, timestamp: impl Into<String>) -> Self {
        SignalRecord { address: address.into(), timestamp: Some(timestamp.into()) }
    }
}

/// Consolidated view of a host: inventory identity plus the latest value of each signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedHostRecord {
    pub address: String,
    pub hostname: String,
    pub purpose: String,
    pub classification: String,
    pub antivirus_last_updated: Option<String>,
    pub log_last_received: Option<String>,
}

impl UnifiedHostRecord {
    /// Parsed antivirus timestamp. `None` when absent or malformed.
    pub fn antivirus_timestamp(&self) -> Option<PrimitiveDateTime> {
        self.antivirus_last_updated.as_deref().and_then(parse_timestamp)
    }

    /// Parsed log timestamp. `None` when absent or malformed.
    pub fn log_timestamp(&self) -> Option<PrimitiveDateTime> {
        self.log_last_received.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Green => "green",
            Tier::Yellow => "yellow",
            Tier::Red => "red",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Computed status of one group of hosts. Derived on every query, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatus {
    pub tier: Tier,
    pub member_count: usize,
}
