use rusqlite::{params, Connection, Row};

use super::Database;
use crate::error::KayuError;
use crate::models::TransactionLog;

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionLog> {
    Ok(TransactionLog {
        id: row.get("id")?,
        contact_id: row.get("contact_id")?,
        kind: row.get("kind")?,
        category: row.get("category")?,
        amount: row.get("amount")?,
        description: row.get("description")?,
        reference_id: row.get("reference_id")?,
        reference_type: row.get("reference_type")?,
        payment_method: row.get("payment_method")?,
        expense_id: row.get("expense_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(super) fn insert_transaction_in(
    conn: &Connection,
    t: &TransactionLog,
) -> Result<(), KayuError> {
    conn.execute(
        "INSERT INTO transactions (id, contact_id, kind, category, amount, description,
            reference_id, reference_type, payment_method, expense_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            t.id,
            t.contact_id,
            t.kind,
            t.category,
            t.amount,
            t.description,
            t.reference_id,
            t.reference_type,
            t.payment_method,
            t.expense_id,
            t.created_at
        ],
    )?;
    Ok(())
}

pub(super) fn list_transactions_in(conn: &Connection) -> Result<Vec<TransactionLog>, KayuError> {
    let mut stmt = conn.prepare("SELECT * FROM transactions ORDER BY created_at DESC")?;
    let rows = stmt.query_map([], transaction_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    /// The cash ledger, newest first.
    pub fn list_transactions(&self) -> Result<Vec<TransactionLog>, KayuError> {
        list_transactions_in(&self.conn())
    }
}
