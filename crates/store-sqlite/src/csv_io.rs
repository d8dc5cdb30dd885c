//! CSV interchange for the source tables and the unified snapshot.

use anyhow::Result;
use hostwatch_core::{HostInventoryRecord, HostScope, RecordStore, SignalRecord};
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

use crate::Db;

fn read_records<T: DeserializeOwned, R: Read>(input: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

/// Columns: `address` (or `ip_address`), `hostname`, `purpose`, `classification`.
pub fn read_inventory_csv<R: Read>(input: R) -> Result<Vec<HostInventoryRecord>> {
    read_records(input)
}

/// Columns: `address` (or `ip_address`) and `timestamp`; an empty timestamp means absent.
pub fn read_signals_csv<R: Read>(input: R) -> Result<Vec<SignalRecord>> {
    read_records(input)
}

impl Db {
    pub fn write_snapshot_csv<W: Write>(&self, out: W) -> Result<usize> {
        let hosts = self.fetch_unified_hosts(&HostScope::All)?;
        let mut wtr = csv::Writer::from_writer(out);
        for h in &hosts {
            wtr.serialize(h)?;
        }
        wtr.flush()?;
        Ok(hosts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::UnifiedHostRecord;

    #[test]
    fn reads_inventory_with_original_headers() {
        let data = "ip_address,hostname,purpose,classification\n10.0.0.1,web-001,webserver,production\n";
        let hosts = read_inventory_csv(data.as_bytes()).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "10.0.0.1");
        assert_eq!(hosts[0].classification, "production");
    }

    #[test]
    fn empty_signal_timestamp_is_absent() {
        let data = "address,timestamp\n10.0.0.1,2024-01-01 00:00:00\n10.0.0.2,\n";
        let sigs = read_signals_csv(data.as_bytes()).unwrap();
        assert_eq!(sigs[0].timestamp.as_deref(), Some("2024-01-01 00:00:00"));
        assert_eq!(sigs[1].timestamp, None);
    }

    #[test]
    fn snapshot_export_writes_header_and_rows() {
        let mut db = Db::open_in_memory().unwrap();
        db.replace_unified_hosts(&[UnifiedHostRecord {
            address: "10.0.0.1".into(),
            hostname: "web-001".into(),
            purpose: "webserver".into(),
            classification: "production".into(),
            antivirus_last_updated: None,
            log_last_received: Some("2024-01-01 00:00:00".into()),
        }])
        .unwrap();
        let mut buf = Vec::new();
        assert_eq!(db.write_snapshot_csv(&mut buf).unwrap(), 1);
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("address,hostname,purpose,classification,antivirus_last_updated,log_last_received")
        );
        assert_eq!(lines.next(), Some("10.0.0.1,web-001,webserver,production,,2024-01-01 00:00:00"));
    }
}
