use rusqlite::Connection;

use crate::error::KayuError;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id            BLOB PRIMARY KEY,
    name          TEXT NOT NULL,
    contact_type  TEXT NOT NULL,
    email         TEXT,
    phone         TEXT,
    address       TEXT,
    balance       REAL NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    id                BLOB PRIMARY KEY,
    invoice_number    TEXT NOT NULL,
    contact_id        BLOB REFERENCES contacts(id) ON DELETE SET NULL,
    wood_type         TEXT NOT NULL,
    length            REAL NOT NULL,
    d1                REAL NOT NULL,
    d2                REAL NOT NULL,
    d3                REAL NOT NULL,
    d4                REAL NOT NULL,
    trim              REAL NOT NULL DEFAULT 0,
    gr                REAL NOT NULL DEFAULT 0,
    avg_diameter      REAL NOT NULL,
    effective_length  REAL NOT NULL,
    gross_volume      REAL NOT NULL,
    gr_volume         REAL NOT NULL,
    net_volume        REAL NOT NULL,
    unit_price        REAL NOT NULL,
    total_value       REAL NOT NULL,
    status            TEXT NOT NULL DEFAULT 'available',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_inventory_status ON inventory(status);
CREATE INDEX IF NOT EXISTS idx_inventory_invoice ON inventory(invoice_number);

CREATE TABLE IF NOT EXISTS sales (
    id                BLOB PRIMARY KEY,
    invoice_number    TEXT NOT NULL,
    contact_id        BLOB REFERENCES contacts(id) ON DELETE SET NULL,
    inventory_id      BLOB REFERENCES inventory(id) ON DELETE SET NULL,
    wood_type         TEXT,
    length            REAL,
    d1                REAL,
    d2                REAL,
    d3                REAL,
    d4                REAL,
    trim              REAL,
    gr                REAL,
    avg_diameter      REAL,
    effective_length  REAL,
    gross_volume      REAL,
    gr_volume         REAL,
    net_volume        REAL NOT NULL,
    unit_price        REAL NOT NULL,
    total_price       REAL NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    notes             TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id           BLOB PRIMARY KEY,
    category     TEXT NOT NULL,
    amount       REAL NOT NULL,
    description  TEXT,
    date         TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id              BLOB PRIMARY KEY,
    contact_id      BLOB REFERENCES contacts(id) ON DELETE SET NULL,
    kind            TEXT NOT NULL,
    category        TEXT NOT NULL,
    amount          REAL NOT NULL,
    description     TEXT,
    reference_id    BLOB,
    reference_type  TEXT,
    payment_method  TEXT,
    expense_id      BLOB UNIQUE REFERENCES expenses(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transactions_reference ON transactions(reference_id);

CREATE TABLE IF NOT EXISTS users (
    id             BLOB PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name           TEXT NOT NULL,
    role           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active',
    password_hash  TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    last_login_at  TEXT
);
"#;

/// Create or upgrade the schema. Safe to run on every start.
pub fn migrate(conn: &Connection) -> Result<(), KayuError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < 1 {
        tracing::info!("Creating database schema v{SCHEMA_VERSION}");
        conn.execute_batch(SCHEMA_V1)?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    } else {
        tracing::debug!("Database schema at v{version}");
    }
    Ok(())
}
