use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KayuError;

/// Expense categories offered by default. Any non-empty category is accepted.
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 8] = [
    "Gaji Karyawan",
    "BBM",
    "Maintenance",
    "Listrik",
    "Air",
    "Asuransi",
    "Pajak",
    "Lainnya",
];

/// An operating expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    /// Date the money was spent (not necessarily when it was recorded).
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), KayuError> {
        if self.category.trim().is_empty() {
            return Err(KayuError::ValidationError(
                "Expense category must not be empty".to_string(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(KayuError::ValidationError(format!(
                "Expense amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn into_expense(self) -> Expense {
        let now = Utc::now();
        Expense {
            id: Uuid::new_v4(),
            category: self.category.trim().to_string(),
            amount: self.amount,
            description: self.description,
            date: self.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        }
    }
}
