use chrono::Utc;

use super::contacts::{insert_contact_in, list_contacts_in};
use super::expenses::{insert_expense_in, list_expenses_in};
use super::inventory::{insert_item_in, list_items_in};
use super::sales::{insert_sale_in, list_sales_in};
use super::transactions::{insert_transaction_in, list_transactions_in};
use super::users::list_users_in;
use super::Database;
use crate::error::KayuError;
use crate::models::Snapshot;

impl Database {
    /// Load every record into memory. Users come without password hashes.
    pub fn snapshot(&self) -> Result<Snapshot, KayuError> {
        let conn = self.conn();
        Ok(Snapshot {
            exported_at: Utc::now(),
            contacts: list_contacts_in(&conn)?,
            inventory: list_items_in(&conn)?,
            sales: list_sales_in(&conn)?,
            expenses: list_expenses_in(&conn)?,
            transactions: list_transactions_in(&conn)?,
            users: list_users_in(&conn)?,
        })
    }

    /// Replace all business data with the contents of `snapshot` in one
    /// transaction. Inconsistent snapshots are rejected before anything is
    /// touched. User accounts are left untouched, since backups carry no
    /// password hashes.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<(), KayuError> {
        snapshot.validate()?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM transactions;
             DELETE FROM sales;
             DELETE FROM inventory;
             DELETE FROM expenses;
             DELETE FROM contacts;",
        )?;

        for contact in &snapshot.contacts {
            insert_contact_in(&tx, contact)?;
        }
        for item in &snapshot.inventory {
            insert_item_in(&tx, item)?;
        }
        for sale in &snapshot.sales {
            insert_sale_in(&tx, sale)?;
        }
        for expense in &snapshot.expenses {
            insert_expense_in(&tx, expense)?;
        }
        for entry in &snapshot.transactions {
            insert_transaction_in(&tx, entry)?;
        }
        tx.commit()?;

        tracing::info!(
            "Restored backup from {}: {} contacts, {} inventory, {} sales, {} expenses, \
             {} ledger rows",
            snapshot.exported_at,
            snapshot.contacts.len(),
            snapshot.inventory.len(),
            snapshot.sales.len(),
            snapshot.expenses.len(),
            snapshot.transactions.len()
        );
        Ok(())
    }
}
