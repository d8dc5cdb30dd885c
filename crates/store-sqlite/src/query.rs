use crate::models::{row_error, store_error, inventory_from_row, signal_from_row, unified_from_row, ANTIVIRUS, DASHBOARD, HOSTS, LOGSERVER};
use crate::Db;
use hostwatch_core::store::Result;
use hostwatch_core::{HostInventoryRecord, HostScope, SignalRecord, UnifiedHostRecord};
use rusqlite::{params_from_iter, Row};

const UNIFIED_COLUMNS: &str =
    "ip_address,hostname,purpose,classification,antivirus_last_updated,logserver_last_received";

impl Db {
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let cnt: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
                [name],
                |r| r.get(0),
            )
            .map_err(store_error)?;
        Ok(cnt > 0)
    }

    pub fn inventory(&self) -> Result<Vec<HostInventoryRecord>> {
        self.select(
            HOSTS,
            "SELECT ip_address,hostname,purpose,classification FROM hosts ORDER BY id",
            &[],
            inventory_from_row,
        )
    }

    /// Rows come back in insertion order, so later duplicates follow earlier ones.
    pub fn antivirus_signals(&self) -> Result<Vec<SignalRecord>> {
        self.select(
            ANTIVIRUS,
            "SELECT ip_address,last_updated_datetime FROM antivirus_hosts ORDER BY id",
            &[],
            signal_from_row,
        )
    }

    pub fn log_signals(&self) -> Result<Vec<SignalRecord>> {
        self.select(
            LOGSERVER,
            "SELECT ip_address,last_log_received_datetime FROM logserver_hosts ORDER BY id",
            &[],
            signal_from_row,
        )
    }

    pub fn unified_hosts(&self, scope: &HostScope) -> Result<Vec<UnifiedHostRecord>> {
        let (filter, args): (&str, Vec<&str>) = match scope {
            HostScope::All => ("", vec![]),
            HostScope::Classification(c) => (" WHERE classification=?", vec![c.as_str()]),
            HostScope::Purpose { classification, purpose } => (
                " WHERE classification=? AND purpose=?",
                vec![classification.as_str(), purpose.as_str()],
            ),
        };
        let sql = format!("SELECT {UNIFIED_COLUMNS} FROM dashboard_hosts{filter} ORDER BY id");
        self.select(DASHBOARD, &sql, &args, unified_from_row)
    }

    fn select<T>(
        &self,
        table: &'static str,
        sql: &str,
        args: &[&str],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql).map_err(store_error)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), map)
            .map_err(store_error)?;
        rows.map(|r| r.map_err(|e| row_error(table, e))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::{RecordStore, StoreError};

    fn inv(addr: &str, purpose: &str, class: &str) -> HostInventoryRecord {
        HostInventoryRecord {
            address: addr.into(),
            hostname: format!("h-{addr}"),
            purpose: purpose.into(),
            classification: class.into(),
        }
    }

    #[test]
    fn signals_come_back_in_insertion_order() {
        let db = Db::open_in_memory().unwrap();
        db.insert_inventory(&[inv("10.0.0.1", "webserver", "production")]).unwrap();
        db.insert_antivirus_signals(&[
            SignalRecord::new("10.0.0.1", "2024-01-02 00:00:00"),
            SignalRecord::new("10.0.0.1", "2024-01-01 00:00:00"),
        ])
        .unwrap();
        let sigs = db.fetch_antivirus_signals().unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[1].timestamp.as_deref(), Some("2024-01-01 00:00:00"));
        let hostname: Option<String> = db
            .conn
            .query_row("SELECT hostname FROM antivirus_hosts LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hostname.as_deref(), Some("h-10.0.0.1"));
    }

    #[test]
    fn inventory_upsert_keeps_one_row_per_address() {
        let db = Db::open_in_memory().unwrap();
        db.insert_inventory(&[
            inv("10.0.0.1", "webserver", "production"),
            inv("10.0.0.1", "database", "staging"),
        ])
        .unwrap();
        let hosts = db.fetch_all_hosts().unwrap();
        assert_eq!(hosts, vec![inv("10.0.0.1", "database", "staging")]);
    }

    #[test]
    fn non_text_timestamp_is_read_not_rejected() {
        let db = Db::open_in_memory().unwrap();
        db.conn
            .execute("INSERT INTO logserver_hosts(ip_address,last_log_received_datetime) VALUES ('10.0.0.1', 20240101)", [])
            .unwrap();
        let sigs = db.fetch_log_signals().unwrap();
        assert_eq!(sigs[0].timestamp.as_deref(), Some("20240101"));
    }

    #[test]
    fn scope_filters_snapshot() {
        let mut db = Db::open_in_memory().unwrap();
        let unified = |addr: &str, p: &str, c: &str| UnifiedHostRecord {
            address: addr.into(),
            hostname: "h".into(),
            purpose: p.into(),
            classification: c.into(),
            antivirus_last_updated: None,
            log_last_received: None,
        };
        db.replace_unified_hosts(&[
            unified("a", "webserver", "production"),
            unified("b", "database", "production"),
            unified("c", "webserver", "staging"),
        ])
        .unwrap();
        assert_eq!(db.fetch_unified_hosts(&HostScope::All).unwrap().len(), 3);
        assert_eq!(
            db.fetch_unified_hosts(&HostScope::Classification("production".into())).unwrap().len(),
            2
        );
        let scoped = db
            .fetch_unified_hosts(&HostScope::Purpose {
                classification: "production".into(),
                purpose: "webserver".into(),
            })
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].address, "a");
    }

    #[test]
    fn broken_schema_is_an_error() {
        let db = Db::open_in_memory().unwrap();
        db.conn.execute_batch("DROP TABLE hosts; CREATE TABLE hosts (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
        assert!(db.fetch_all_hosts().is_err());
    }

    #[test]
    fn wrong_column_type_is_a_schema_error() {
        let db = Db::open_in_memory().unwrap();
        db.conn
            .execute_batch(
                "DROP TABLE hosts;
                 CREATE TABLE hosts (id INTEGER PRIMARY KEY, ip_address, hostname, purpose, classification);
                 INSERT INTO hosts(ip_address,hostname,purpose,classification) VALUES (X'00', 'h', 'p', 'c');",
            )
            .unwrap();
        match db.fetch_all_hosts() {
            Err(StoreError::Schema { table, .. }) => assert_eq!(table, "hosts"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
