use crate::Db;
use hostwatch_core::store::Result;
use hostwatch_core::{HostInventoryRecord, HostScope, RecordStore, SignalRecord, UnifiedHostRecord};

impl RecordStore for Db {
    fn fetch_all_hosts(&self) -> Result<Vec<HostInventoryRecord>> {
        self.inventory()
    }

    fn fetch_antivirus_signals(&self) -> Result<Vec<SignalRecord>> {
        self.antivirus_signals()
    }

    fn fetch_log_signals(&self) -> Result<Vec<SignalRecord>> {
        self.log_signals()
    }

    fn replace_unified_hosts(&mut self, hosts: &[UnifiedHostRecord]) -> Result<()> {
        let mut swap = self.begin_snapshot_swap()?;
        for h in hosts {
            swap.stage(h)?;
        }
        swap.commit()?;
        Ok(())
    }

    fn fetch_unified_hosts(&self, scope: &HostScope) -> Result<Vec<UnifiedHostRecord>> {
        self.unified_hosts(scope)
    }
}
