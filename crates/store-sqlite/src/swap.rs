use crate::models::{store_error, DASHBOARD};
use crate::Db;
use hostwatch_core::store::Result;
use hostwatch_core::UnifiedHostRecord;
use rusqlite::{params, Transaction, TransactionBehavior};

/// A snapshot replacement in progress.
///
/// The old rows are deleted and new rows staged inside one write transaction.
/// Other connections keep reading the previous snapshot until `commit`; dropping
/// the swap without committing rolls everything back.
pub struct SnapshotSwap<'a> {
    tx: Transaction<'a>,
    staged: usize,
}

impl Db {
    pub fn begin_snapshot_swap(&mut self) -> Result<SnapshotSwap<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_error)?;
        tx.execute("DELETE FROM dashboard_hosts", []).map_err(store_error)?;
        Ok(SnapshotSwap { tx, staged: 0 })
    }
}

impl SnapshotSwap<'_> {
    pub fn stage(&mut self, host: &UnifiedHostRecord) -> Result<()> {
        self.tx
            .execute(
                "INSERT INTO dashboard_hosts(ip_address,hostname,purpose,classification,antivirus_last_updated,logserver_last_received)
                 VALUES (?,?,?,?,?,?)
                 ON CONFLICT(ip_address) DO UPDATE SET hostname=excluded.hostname, purpose=excluded.purpose, classification=excluded.classification,
                   antivirus_last_updated=excluded.antivirus_last_updated, logserver_last_received=excluded.logserver_last_received",
                params![
                    host.address,
                    host.hostname,
                    host.purpose,
                    host.classification,
                    host.antivirus_last_updated,
                    host.log_last_received
                ],
            )
            .map_err(store_error)?;
        self.staged += 1;
        Ok(())
    }

    pub fn staged(&self) -> usize {
        self.staged
    }

    pub fn commit(self) -> Result<usize> {
        self.tx.commit().map_err(store_error)?;
        tracing::info!(table = DASHBOARD, rows = self.staged, "snapshot swapped");
        Ok(self.staged)
    }
}
