use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KayuError;

/// Whether a contact sells logs to the yard or buys from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Supplier,
    Customer,
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactType::Supplier => write!(f, "supplier"),
            ContactType::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for ContactType {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supplier" | "s" => Ok(ContactType::Supplier),
            "customer" | "c" => Ok(ContactType::Customer),
            _ => Err(KayuError::ParseError(format!("Unknown contact type: '{s}'"))),
        }
    }
}

/// A supplier or customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub contact_type: ContactType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Running balance. Negative on a supplier means the yard owes them;
    /// positive on a customer means they owe the yard.
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Amount the yard owes this contact, if it is a supplier in debt.
    pub fn debt(&self) -> f64 {
        if self.contact_type == ContactType::Supplier && self.balance < 0.0 {
            self.balance.abs()
        } else {
            0.0
        }
    }

    /// Amount this contact owes the yard, if it is a customer.
    pub fn receivable(&self) -> f64 {
        if self.contact_type == ContactType::Customer && self.balance > 0.0 {
            self.balance
        } else {
            0.0
        }
    }
}

/// Input for creating a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub contact_type: ContactType,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

impl NewContact {
    pub fn validate(&self) -> Result<(), KayuError> {
        if self.name.trim().is_empty() {
            return Err(KayuError::ValidationError(
                "Contact name must not be empty".to_string(),
            ));
        }
        if !self.balance.is_finite() {
            return Err(KayuError::ValidationError(format!(
                "Contact balance must be a finite number, got {}",
                self.balance
            )));
        }
        Ok(())
    }
}

/// Partial update for a contact; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub contact_type: Option<ContactType>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub balance: Option<f64>,
}

impl ContactUpdate {
    pub fn apply(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(t) = self.contact_type {
            contact.contact_type = t;
        }
        if let Some(email) = &self.email {
            contact.email = Some(email.clone());
        }
        if let Some(phone) = &self.phone {
            contact.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            contact.address = Some(address.clone());
        }
        if let Some(balance) = self.balance {
            contact.balance = balance;
        }
    }
}
