//! Tiered views over the unified snapshot: all hosts, then classification, then purpose, then host.
//!
//! Nothing here is cached; each call reads the snapshot and evaluates it against the
//! supplied threshold and the current clock.

use compliance::{group_statuses, HostFreshness};
use hostwatch_core::store::Result;
use hostwatch_core::{now_local, GroupStatus, HostScope, RecordStore, Settings, ThresholdDays, UnifiedHostRecord};
use indexmap::IndexMap;
use serde::Serialize;
use time::PrimitiveDateTime;

/// One row of the host detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDetail {
    #[serde(flatten)]
    pub host: UnifiedHostRecord,
    pub antivirus_fresh: bool,
    pub log_fresh: bool,
    pub compliant: bool,
}

pub struct Dashboard<S> {
    store: S,
    settings: Settings,
    clock: fn() -> PrimitiveDateTime,
}

impl<S: RecordStore> Dashboard<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Dashboard { store, settings, clock: now_local }
    }

    pub fn with_clock(mut self, clock: fn() -> PrimitiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Normalize a caller-supplied threshold; bad input becomes the configured default.
    pub fn threshold(&self, raw: Option<&str>) -> ThresholdDays {
        self.settings.threshold(raw)
    }

    /// Status per classification across all hosts.
    pub fn top_level_statuses(&self, threshold: ThresholdDays) -> Result<IndexMap<String, GroupStatus>> {
        let hosts = self.store.fetch_unified_hosts(&HostScope::All)?;
        let now = (self.clock)();
        tracing::debug!(hosts = hosts.len(), %threshold, "evaluating classifications");
        Ok(group_statuses(&hosts, |h| h.classification.as_str(), now, threshold))
    }

    /// Status per purpose within one classification. Unknown classifications yield an empty map.
    pub fn purpose_statuses(&self, classification: &str, threshold: ThresholdDays) -> Result<IndexMap<String, GroupStatus>> {
        let hosts = self
            .store
            .fetch_unified_hosts(&HostScope::Classification(classification.to_string()))?;
        let now = (self.clock)();
        tracing::debug!(classification, hosts = hosts.len(), %threshold, "evaluating purposes");
        Ok(group_statuses(&hosts, |h| h.purpose.as_str(), now, threshold))
    }

    /// Hosts of one classification and purpose with per-signal freshness.
    pub fn host_details(&self, classification: &str, purpose: &str, threshold: ThresholdDays) -> Result<Vec<HostDetail>> {
        let scope = HostScope::Purpose {
            classification: classification.to_string(),
            purpose: purpose.to_string(),
        };
        let hosts = self.store.fetch_unified_hosts(&scope)?;
        let now = (self.clock)();
        Ok(hosts
            .into_iter()
            .map(|host| {
                let f = HostFreshness::evaluate(&host, now, threshold);
                HostDetail { host, antivirus_fresh: f.antivirus, log_fresh: f.logs, compliant: f.compliant() }
            })
            .collect())
    }
}
