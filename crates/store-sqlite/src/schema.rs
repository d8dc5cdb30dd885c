pub const MIG_0001_INIT: &str = r#"
BEGIN;

CREATE TABLE IF NOT EXISTS hosts (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  ip_address      TEXT NOT NULL UNIQUE,
  hostname        TEXT NOT NULL,
  purpose         TEXT NOT NULL,
  classification  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS antivirus_hosts (
  id                     INTEGER PRIMARY KEY AUTOINCREMENT,
  ip_address             TEXT NOT NULL,
  hostname               TEXT,
  last_updated_datetime  TEXT
);

CREATE TABLE IF NOT EXISTS logserver_hosts (
  id                          INTEGER PRIMARY KEY AUTOINCREMENT,
  ip_address                  TEXT NOT NULL,
  hostname                    TEXT,
  last_log_received_datetime  TEXT
);

CREATE TABLE IF NOT EXISTS dashboard_hosts (
  id                       INTEGER PRIMARY KEY AUTOINCREMENT,
  ip_address               TEXT NOT NULL UNIQUE,
  hostname                 TEXT NOT NULL,
  purpose                  TEXT NOT NULL,
  classification           TEXT NOT NULL,
  antivirus_last_updated   TEXT,
  logserver_last_received  TEXT
);

CREATE INDEX IF NOT EXISTS idx_antivirus_addr ON antivirus_hosts(ip_address);
CREATE INDEX IF NOT EXISTS idx_logserver_addr ON logserver_hosts(ip_address);
CREATE INDEX IF NOT EXISTS idx_dashboard_group ON dashboard_hosts(classification, purpose);

COMMIT;
"#
;
