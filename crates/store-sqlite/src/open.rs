use crate::schema::MIG_0001_INIT;
use crate::models::store_error;
use anyhow::{Context, Result};
use hostwatch_core::StoreError;
use rusqlite::{Connection, OpenFlags};

pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn open_or_create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening record store {}", path.display()))?;
        Self::init(conn)
    }

    /// Open an existing store for reading only. No file, pragma or schema is written;
    /// a missing file is reported as unavailable.
    pub fn open_read_only(path: impl AsRef<std::path::Path>) -> hostwatch_core::store::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::Unavailable(format!("{} does not exist", path.display())));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(store_error)?;
        Ok(Db { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        apply_pragmas(&conn)?;
        migrate(&conn)?;
        Ok(Db { conn })
    }
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    // in-memory databases report "memory" here
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
    tracing::debug!(journal_mode = %mode, "record store opened");
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<()> {
    // naive: if the snapshot table doesn't exist, apply 0001
    let exists: i64 = conn.query_row(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name='dashboard_hosts'",
        [],
        |r| r.get(0),
    )?;
    if exists == 0 {
        conn.execute_batch(MIG_0001_INIT)?;
        tracing::info!("record store schema created");
    }
    Ok(())
}
