use crate::models::{ANTIVIRUS, HOSTS, LOGSERVER};
use crate::Db;
use anyhow::Result;
use hostwatch_core::{HostInventoryRecord, SignalRecord};
use rusqlite::{params, Connection};

/// Source rows to load in one go. `None` leaves that table's contents to the load mode.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub inventory: Option<Vec<HostInventoryRecord>>,
    pub antivirus: Option<Vec<SignalRecord>>,
    pub logs: Option<Vec<SignalRecord>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub inventory: usize,
    pub antivirus: usize,
    pub logs: usize,
}

impl Db {
    /// Upsert inventory rows; a repeated address keeps the last row's identity fields.
    pub fn insert_inventory(&self, hosts: &[HostInventoryRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        write_inventory(&tx, hosts)?;
        tx.commit()?;
        Ok(hosts.len())
    }

    pub fn insert_antivirus_signals(&self, signals: &[SignalRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        write_signals(&tx, ANTIVIRUS, "last_updated_datetime", signals)?;
        tx.commit()?;
        Ok(signals.len())
    }

    pub fn insert_log_signals(&self, signals: &[SignalRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        write_signals(&tx, LOGSERVER, "last_log_received_datetime", signals)?;
        tx.commit()?;
        Ok(signals.len())
    }

    /// Load a batch of source rows in a single transaction. Unless `append` is set, all three
    /// source tables are emptied first. On any failure the tables are left as they were.
    pub fn load_sources(&self, batch: &SourceBatch, append: bool) -> Result<SourceCounts> {
        let tx = self.conn.unchecked_transaction()?;
        if !append {
            clear(&tx)?;
        }
        let mut counts = SourceCounts::default();
        if let Some(rows) = &batch.inventory {
            write_inventory(&tx, rows)?;
            counts.inventory = rows.len();
        }
        if let Some(rows) = &batch.antivirus {
            write_signals(&tx, ANTIVIRUS, "last_updated_datetime", rows)?;
            counts.antivirus = rows.len();
        }
        if let Some(rows) = &batch.logs {
            write_signals(&tx, LOGSERVER, "last_log_received_datetime", rows)?;
            counts.logs = rows.len();
        }
        tx.commit()?;
        Ok(counts)
    }

    /// Empty the inventory and both signal tables. The unified snapshot is left alone.
    pub fn clear_sources(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        clear(&tx)?;
        tx.commit()?;
        Ok(())
    }
}

fn clear(conn: &Connection) -> Result<()> {
    conn.execute_batch("DELETE FROM antivirus_hosts; DELETE FROM logserver_hosts; DELETE FROM hosts;")?;
    Ok(())
}

fn write_inventory(conn: &Connection, hosts: &[HostInventoryRecord]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO hosts(ip_address,hostname,purpose,classification) VALUES (?,?,?,?)
         ON CONFLICT(ip_address) DO UPDATE SET hostname=excluded.hostname, purpose=excluded.purpose, classification=excluded.classification",
    )?;
    for h in hosts {
        stmt.execute(params![h.address, h.hostname, h.purpose, h.classification])?;
    }
    tracing::debug!(table = HOSTS, rows = hosts.len(), "inserted");
    Ok(())
}

fn write_signals(conn: &Connection, table: &'static str, column: &str, signals: &[SignalRecord]) -> Result<()> {
    // hostname is denormalized from inventory when the address is known
    let sql = format!(
        "INSERT INTO {table}(ip_address,hostname,{column}) VALUES (?1,(SELECT hostname FROM hosts WHERE ip_address=?1),?2)"
    );
    let mut stmt = conn.prepare(&sql)?;
    for s in signals {
        stmt.execute(params![s.address, s.timestamp])?;
    }
    tracing::debug!(table, rows = signals.len(), "inserted");
    Ok(())
}
