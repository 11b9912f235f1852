use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KayuError;

/// Direction of money in the cash ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(KayuError::ParseError(format!(
                "Unknown transaction kind: '{s}'"
            ))),
        }
    }
}

/// The record a ledger row points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Sale,
    Expense,
    Inventory,
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceType::Sale => write!(f, "sale"),
            ReferenceType::Expense => write!(f, "expense"),
            ReferenceType::Inventory => write!(f, "inventory"),
        }
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sale" => Ok(ReferenceType::Sale),
            "expense" => Ok(ReferenceType::Expense),
            "inventory" => Ok(ReferenceType::Inventory),
            _ => Err(KayuError::ParseError(format!(
                "Unknown reference type: '{s}'"
            ))),
        }
    }
}

/// Category used for ledger rows written by sales.
pub const SALES_CATEGORY: &str = "Sales";
/// Category used for ledger rows written by batch purchases.
pub const PURCHASE_CATEGORY: &str = "Purchase";

/// One row of the cash ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub id: Uuid,
    pub contact_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<ReferenceType>,
    pub payment_method: Option<String>,
    pub expense_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TransactionLog {
    fn new(kind: TransactionKind, category: &str, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id: None,
            kind,
            category: category.to_string(),
            amount,
            description: None,
            reference_id: None,
            reference_type: None,
            payment_method: None,
            expense_id: None,
            created_at: Utc::now(),
        }
    }

    /// Income row for a sale.
    pub fn for_sale(sale: &crate::models::Sale) -> Self {
        let mut tx = Self::new(TransactionKind::Income, SALES_CATEGORY, sale.total_price);
        tx.contact_id = sale.contact_id;
        tx.description = Some(format!("Penjualan - {}", sale.invoice_number));
        tx.reference_id = Some(sale.id);
        tx.reference_type = Some(ReferenceType::Sale);
        tx.created_at = sale.created_at;
        tx
    }

    /// Expense row for an operating expense.
    pub fn for_expense(expense: &crate::models::Expense) -> Self {
        let mut tx = Self::new(TransactionKind::Expense, &expense.category, expense.amount);
        tx.description = expense.description.clone();
        tx.reference_id = Some(expense.id);
        tx.reference_type = Some(ReferenceType::Expense);
        tx.expense_id = Some(expense.id);
        tx.created_at = expense.created_at;
        tx
    }

    /// Expense row for a batch purchase.
    pub fn for_purchase(invoice_number: &str, contact_id: Option<Uuid>, amount: f64) -> Self {
        let mut tx = Self::new(TransactionKind::Expense, PURCHASE_CATEGORY, amount);
        tx.contact_id = contact_id;
        tx.description = Some(format!("Inventory Baru - {invoice_number}"));
        tx.reference_type = Some(ReferenceType::Inventory);
        tx
    }

    /// Amount with sign: positive for income, negative for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}
