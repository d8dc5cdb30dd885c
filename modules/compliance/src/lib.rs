//! Freshness evaluation and three-tier group status.

use hostwatch_core::{GroupStatus, ThresholdDays, Tier, UnifiedHostRecord};
use indexmap::IndexMap;
use time::PrimitiveDateTime;

/// True iff `timestamp` is present and no older than `threshold` days before `now`.
/// The boundary is inclusive.
pub fn is_fresh(timestamp: Option<PrimitiveDateTime>, now: PrimitiveDateTime, threshold: ThresholdDays) -> bool {
    let Some(ts) = timestamp else { return false };
    match now.checked_sub(threshold.as_duration()) {
        Some(cutoff) => ts >= cutoff,
        // cutoff predates the representable range
        None => true,
    }
}

/// Per-signal freshness for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFreshness {
    pub antivirus: bool,
    pub logs: bool,
}

impl HostFreshness {
    /// A malformed timestamp counts as stale and is logged.
    pub fn evaluate(host: &UnifiedHostRecord, now: PrimitiveDateTime, threshold: ThresholdDays) -> Self {
        HostFreshness {
            antivirus: is_fresh(
                checked(host, "antivirus", host.antivirus_last_updated.as_deref(), host.antivirus_timestamp()),
                now,
                threshold,
            ),
            logs: is_fresh(checked(host, "logs", host.log_last_received.as_deref(), host.log_timestamp()), now, threshold),
        }
    }

    /// Both signals must be fresh.
    pub fn compliant(self) -> bool {
        self.antivirus && self.logs
    }
}

fn checked(
    host: &UnifiedHostRecord,
    signal: &'static str,
    raw: Option<&str>,
    parsed: Option<PrimitiveDateTime>,
) -> Option<PrimitiveDateTime> {
    if let (Some(raw), None) = (raw, parsed) {
        tracing::warn!(address = %host.address, signal, value = raw, "unparseable timestamp, treating as stale");
    }
    parsed
}

pub fn is_host_compliant(host: &UnifiedHostRecord, now: PrimitiveDateTime, threshold: ThresholdDays) -> bool {
    HostFreshness::evaluate(host, now, threshold).compliant()
}

/// Tier for a group: all compliant is green, at least 80% is yellow, anything less is red.
/// An empty group is red.
pub fn compute_group_status(hosts: &[UnifiedHostRecord], now: PrimitiveDateTime, threshold: ThresholdDays) -> GroupStatus {
    let total = hosts.len();
    if total == 0 {
        return GroupStatus { tier: Tier::Red, member_count: 0 };
    }
    let compliant = hosts.iter().filter(|h| is_host_compliant(h, now, threshold)).count();
    GroupStatus { tier: tier_for(compliant, total), member_count: total }
}

fn tier_for(compliant: usize, total: usize) -> Tier {
    if compliant == total {
        Tier::Green
    } else if compliant * 5 >= total * 4 {
        // compliant >= 0.8 * total, in integers
        Tier::Yellow
    } else {
        Tier::Red
    }
}

/// Partition hosts by a key, keeping groups in order of first appearance.
pub fn partition_by<'a, F>(hosts: &'a [UnifiedHostRecord], key: F) -> IndexMap<&'a str, Vec<UnifiedHostRecord>>
where
    F: Fn(&'a UnifiedHostRecord) -> &'a str,
{
    let mut groups: IndexMap<&'a str, Vec<UnifiedHostRecord>> = IndexMap::new();
    for h in hosts {
        groups.entry(key(h)).or_default().push(h.clone());
    }
    groups
}

/// Status per distinct key value, in order of first appearance.
pub fn group_statuses<'a, F>(
    hosts: &'a [UnifiedHostRecord],
    key: F,
    now: PrimitiveDateTime,
    threshold: ThresholdDays,
) -> IndexMap<String, GroupStatus>
where
    F: Fn(&'a UnifiedHostRecord) -> &'a str,
{
    partition_by(hosts, key)
        .into_iter()
        .map(|(k, members)| (k.to_string(), compute_group_status(&members, now, threshold)))
        .collect()
}
