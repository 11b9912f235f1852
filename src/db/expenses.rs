use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::transactions::insert_transaction_in;
use super::Database;
use crate::error::KayuError;
use crate::models::{Expense, NewExpense, TransactionLog};

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get("id")?,
        category: row.get("category")?,
        amount: row.get("amount")?,
        description: row.get("description")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
    })
}

pub(super) fn insert_expense_in(conn: &Connection, e: &Expense) -> Result<(), KayuError> {
    conn.execute(
        "INSERT INTO expenses (id, category, amount, description, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![e.id, e.category, e.amount, e.description, e.date, e.created_at],
    )?;
    Ok(())
}

pub(super) fn list_expenses_in(conn: &Connection) -> Result<Vec<Expense>, KayuError> {
    let mut stmt =
        conn.prepare("SELECT * FROM expenses ORDER BY date DESC, created_at DESC")?;
    let rows = stmt.query_map([], expense_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    /// Store an expense together with its ledger row.
    pub fn create_expense(&self, new: NewExpense) -> Result<Expense, KayuError> {
        new.validate()?;
        let expense = new.into_expense();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        insert_expense_in(&tx, &expense)?;
        insert_transaction_in(&tx, &TransactionLog::for_expense(&expense))?;
        tx.commit()?;
        tracing::info!(
            "Recorded expense {:.2} under '{}' for {}",
            expense.amount,
            expense.category,
            expense.date
        );
        Ok(expense)
    }

    /// All expenses, latest date first.
    pub fn list_expenses(&self) -> Result<Vec<Expense>, KayuError> {
        list_expenses_in(&self.conn())
    }

    /// Delete an expense. Its ledger row goes with it via `ON DELETE CASCADE`.
    pub fn delete_expense(&self, id: Uuid) -> Result<(), KayuError> {
        let affected = self.conn().execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(KayuError::NotFound(format!("Expense {id} not found")));
        }
        tracing::info!("Deleted expense {id}");
        Ok(())
    }
}
