use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Contact, Expense, InventoryItem, Sale, TransactionLog, User};
use crate::error::KayuError;

fn unique_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a Uuid>,
) -> Result<HashSet<&'a Uuid>, KayuError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(KayuError::ValidationError(format!(
                "Backup lists {kind} {id} more than once"
            )));
        }
    }
    Ok(seen)
}

fn check_ref(
    known: &HashSet<&Uuid>,
    id: Option<&Uuid>,
    owner: &str,
    target: &str,
) -> Result<(), KayuError> {
    match id {
        Some(id) if !known.contains(id) => Err(KayuError::ValidationError(format!(
            "Backup {owner} refers to missing {target} {id}"
        ))),
        _ => Ok(()),
    }
}

/// Every business record at one point in time.
///
/// Used as the backup file format and as the input to reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub transactions: Vec<TransactionLog>,
    /// Accounts without password hashes; informational only.
    #[serde(default)]
    pub users: Vec<User>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            exported_at: Utc::now(),
            contacts: Vec::new(),
            inventory: Vec::new(),
            sales: Vec::new(),
            expenses: Vec::new(),
            transactions: Vec::new(),
            users: Vec::new(),
        }
    }

    /// Total number of business records, users excluded.
    pub fn num_records(&self) -> usize {
        self.contacts.len()
            + self.inventory.len()
            + self.sales.len()
            + self.expenses.len()
            + self.transactions.len()
    }

    /// Check that ids are unique and every reference points at a record in
    /// the same snapshot. A log may back at most one non-cancelled sale.
    pub fn validate(&self) -> Result<(), KayuError> {
        let contacts = unique_ids("contact", self.contacts.iter().map(|c| &c.id))?;
        let inventory = unique_ids("inventory item", self.inventory.iter().map(|i| &i.id))?;
        unique_ids("sale", self.sales.iter().map(|s| &s.id))?;
        let expenses = unique_ids("expense", self.expenses.iter().map(|e| &e.id))?;
        unique_ids("transaction", self.transactions.iter().map(|t| &t.id))?;
        unique_ids(
            "expense ledger row for",
            self.transactions.iter().filter_map(|t| t.expense_id.as_ref()),
        )?;

        for item in &self.inventory {
            check_ref(&contacts, item.contact_id.as_ref(), "inventory item", "contact")?;
        }
        let mut sold = HashSet::new();
        for sale in &self.sales {
            check_ref(&contacts, sale.contact_id.as_ref(), "sale", "contact")?;
            check_ref(&inventory, sale.inventory_id.as_ref(), "sale", "inventory item")?;
            if let (Some(id), false) = (sale.inventory_id, sale.is_cancelled()) {
                if !sold.insert(id) {
                    return Err(KayuError::ValidationError(format!(
                        "Backup sells inventory item {id} more than once"
                    )));
                }
            }
        }
        for entry in &self.transactions {
            check_ref(&contacts, entry.contact_id.as_ref(), "transaction", "contact")?;
            check_ref(&expenses, entry.expense_id.as_ref(), "transaction", "expense")?;
        }
        Ok(())
    }

    pub fn inventory_item(&self, id: &Uuid) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == *id)
    }
}
