//! Join inventory with the antivirus and log-shipping signals into one record per host.

use hostwatch_core::store::Result;
use hostwatch_core::{HostInventoryRecord, RecordStore, SignalRecord, UnifiedHostRecord};
use std::collections::HashMap;

/// Address -> timestamp. A repeated address keeps the entry that appears last in `signals`.
fn latest_by_address(signals: &[SignalRecord]) -> HashMap<&str, Option<&str>> {
    let mut map = HashMap::with_capacity(signals.len());
    for s in signals {
        map.insert(s.address.as_str(), s.timestamp.as_deref());
    }
    map
}

/// Build the unified record set.
///
/// One record is emitted per distinct inventory address, in order of first appearance.
/// A repeated inventory address keeps its position but takes the identity fields of the
/// last occurrence. Hosts missing from a signal set get `None` for that field.
pub fn consolidate(
    inventory: &[HostInventoryRecord],
    av_signals: &[SignalRecord],
    log_signals: &[SignalRecord],
) -> Vec<UnifiedHostRecord> {
    let av = latest_by_address(av_signals);
    let logs = latest_by_address(log_signals);

    let mut position: HashMap<&str, usize> = HashMap::with_capacity(inventory.len());
    let mut out: Vec<UnifiedHostRecord> = Vec::with_capacity(inventory.len());
    for host in inventory {
        let record = UnifiedHostRecord {
            address: host.address.clone(),
            hostname: host.hostname.clone(),
            purpose: host.purpose.clone(),
            classification: host.classification.clone(),
            antivirus_last_updated: av.get(host.address.as_str()).copied().flatten().map(str::to_string),
            log_last_received: logs.get(host.address.as_str()).copied().flatten().map(str::to_string),
        };
        match position.get(host.address.as_str()) {
            Some(&idx) => {
                tracing::debug!(address = %host.address, "duplicate inventory address, last row wins");
                out[idx] = record;
            }
            None => {
                position.insert(host.address.as_str(), out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Outcome of one offline consolidation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub hosts: usize,
    pub with_antivirus: usize,
    pub with_logs: usize,
}

/// Read inventory and both signal sets, consolidate, and swap in the new snapshot.
///
/// An empty inventory produces an empty snapshot, not an error. Store failures abort the run
/// before anything is replaced.
pub fn run<S: RecordStore + ?Sized>(store: &mut S) -> Result<RunSummary> {
    let inventory = store.fetch_all_hosts()?;
    let av = store.fetch_antivirus_signals()?;
    let logs = store.fetch_log_signals()?;
    tracing::debug!(
        inventory = inventory.len(),
        antivirus = av.len(),
        logs = logs.len(),
        "sources loaded"
    );

    let unified = consolidate(&inventory, &av, &logs);
    let summary = RunSummary {
        hosts: unified.len(),
        with_antivirus: unified.iter().filter(|h| h.antivirus_last_updated.is_some()).count(),
        with_logs: unified.iter().filter(|h| h.log_last_received.is_some()).count(),
    };
    if summary.hosts == 0 {
        tracing::warn!("inventory is empty, snapshot will be cleared");
    }
    store.replace_unified_hosts(&unified)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::HostScope;
    use store_sqlite::Db;

    fn inv(addr: &str, hostname: &str) -> HostInventoryRecord {
        HostInventoryRecord {
            address: addr.into(),
            hostname: hostname.into(),
            purpose: "webserver".into(),
            classification: "production".into(),
        }
    }

    #[test]
    fn missing_signals_are_absent_not_defaulted() {
        let out = consolidate(
            &[inv("A", "h1"), inv("B", "h2")],
            &[SignalRecord::new("A", "2024-05-01 10:00:00")],
            &[SignalRecord::new("B", "2024-05-02 10:00:00")],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].antivirus_last_updated.as_deref(), Some("2024-05-01 10:00:00"));
        assert_eq!(out[0].log_last_received, None);
        assert_eq!(out[1].antivirus_last_updated, None);
        assert_eq!(out[1].log_last_received.as_deref(), Some("2024-05-02 10:00:00"));
    }

    #[test]
    fn later_signal_entry_wins_regardless_of_timestamp() {
        let out = consolidate(
            &[inv("A", "h1")],
            &[
                SignalRecord::new("A", "2024-05-03 00:00:00"),
                SignalRecord::new("A", "2024-05-01 00:00:00"),
            ],
            &[],
        );
        assert_eq!(out[0].antivirus_last_updated.as_deref(), Some("2024-05-01 00:00:00"));
    }

    #[test]
    fn later_absent_signal_entry_clears_earlier_value() {
        let out = consolidate(
            &[inv("A", "h1")],
            &[
                SignalRecord::new("A", "2024-05-03 00:00:00"),
                SignalRecord { address: "A".into(), timestamp: None },
            ],
            &[],
        );
        assert_eq!(out[0].antivirus_last_updated, None);
    }

    #[test]
    fn signals_for_unknown_hosts_are_ignored() {
        let out = consolidate(&[inv("A", "h1")], &[SignalRecord::new("Z", "2024-05-01 00:00:00")], &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].antivirus_last_updated, None);
    }

    #[test]
    fn duplicate_inventory_address_last_identity_wins() {
        let out = consolidate(&[inv("A", "old"), inv("B", "h2"), inv("A", "new")], &[], &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].address, "A");
        assert_eq!(out[0].hostname, "new");
        assert_eq!(out[1].address, "B");
    }

    #[test]
    fn empty_inventory_yields_empty_result() {
        assert!(consolidate(&[], &[SignalRecord::new("A", "2024-05-01 00:00:00")], &[]).is_empty());
    }

    #[test]
    fn consolidation_is_idempotent() {
        let inventory = [inv("A", "h1"), inv("B", "h2")];
        let av = [SignalRecord::new("A", "2024-05-01 00:00:00")];
        let logs = [SignalRecord::new("B", "2024-05-01 00:00:00")];
        assert_eq!(consolidate(&inventory, &av, &logs), consolidate(&inventory, &av, &logs));
    }

    #[test]
    fn run_replaces_snapshot_wholesale() {
        let mut db = Db::open_in_memory().unwrap();
        db.insert_inventory(&[inv("A", "h1"), inv("B", "h2")]).unwrap();
        db.insert_antivirus_signals(&[SignalRecord::new("A", "2024-05-01 00:00:00")]).unwrap();
        db.insert_log_signals(&[
            SignalRecord::new("A", "2024-05-01 00:00:00"),
            SignalRecord::new("B", "2024-05-01 00:00:00"),
        ])
        .unwrap();

        let summary = run(&mut db).unwrap();
        assert_eq!(summary, RunSummary { hosts: 2, with_antivirus: 1, with_logs: 2 });
        assert_eq!(run(&mut db).unwrap(), summary);
        assert_eq!(db.fetch_unified_hosts(&HostScope::All).unwrap().len(), 2);

        db.clear_sources().unwrap();
        assert_eq!(run(&mut db).unwrap().hosts, 0);
        assert!(db.fetch_unified_hosts(&HostScope::All).unwrap().is_empty());
    }
}
