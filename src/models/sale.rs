use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::InventoryItem;
use super::valuation::{WoodLogMeasurement, WoodLogValuation};
use crate::error::KayuError;

/// Default markup applied to the purchase unit price when suggesting a selling price.
pub const DEFAULT_MARKUP: f64 = 1.4;

/// Suggested selling price per cubic unit for a log bought at `purchase_unit_price`.
pub fn suggested_unit_price(purchase_unit_price: f64, markup: f64) -> f64 {
    purchase_unit_price * markup
}

/// Lifecycle of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleStatus::Pending => write!(f, "pending"),
            SaleStatus::Completed => write!(f, "completed"),
            SaleStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SaleStatus {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "p" => Ok(SaleStatus::Pending),
            "completed" | "complete" | "c" => Ok(SaleStatus::Completed),
            "cancelled" | "canceled" | "x" => Ok(SaleStatus::Cancelled),
            _ => Err(KayuError::ParseError(format!("Unknown sale status: '{s}'"))),
        }
    }
}

/// Where the sold volume comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SaleSource {
    /// An existing stock row; its net volume and wood type are copied.
    Inventory { inventory_id: Uuid },
    /// A log measured at the point of sale.
    Manual {
        wood_type: String,
        measurement: WoodLogMeasurement,
    },
}

/// Input for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub invoice_number: String,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    pub source: SaleSource,
    pub unit_price: f64,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub invoice_number: String,
    pub contact_id: Option<Uuid>,
    #[serde(default)]
    pub contact_name: Option<String>,
    pub inventory_id: Option<Uuid>,
    pub wood_type: Option<String>,
    /// Present for manual sales only.
    pub measurement: Option<WoodLogMeasurement>,
    pub valuation: Option<WoodLogValuation>,
    pub net_volume: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Build a sale from its input. `stock` must be the row named by an
    /// inventory source and is ignored for manual sales.
    pub fn build(new: &NewSale, stock: Option<&InventoryItem>) -> Result<Self, KayuError> {
        if new.invoice_number.trim().is_empty() {
            return Err(KayuError::ValidationError(
                "Invoice number must not be empty".to_string(),
            ));
        }
        if !new.unit_price.is_finite() || new.unit_price < 0.0 {
            return Err(KayuError::ValidationError(format!(
                "Unit price must be a non-negative number, got {}",
                new.unit_price
            )));
        }

        if new.status == Some(SaleStatus::Cancelled) {
            return Err(KayuError::ValidationError(
                "A sale cannot be created as cancelled".to_string(),
            ));
        }

        let (inventory_id, wood_type, measurement, valuation, net_volume) = match &new.source {
            SaleSource::Inventory { inventory_id } => {
                let item = stock
                    .filter(|item| item.id == *inventory_id)
                    .ok_or_else(|| {
                        KayuError::NotFound(format!("Inventory item {inventory_id} not found"))
                    })?;
                if !item.is_available() {
                    return Err(KayuError::ValidationError(format!(
                        "Inventory item {inventory_id} is already {}",
                        item.status
                    )));
                }
                (
                    Some(item.id),
                    Some(item.wood_type.clone()),
                    None,
                    None,
                    item.valuation.net_volume,
                )
            }
            SaleSource::Manual {
                wood_type,
                measurement,
            } => {
                measurement.validate()?;
                let valuation = measurement.valuate();
                (
                    None,
                    Some(wood_type.clone()),
                    Some(*measurement),
                    Some(valuation),
                    valuation.net_volume,
                )
            }
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            invoice_number: new.invoice_number.clone(),
            contact_id: new.contact_id,
            contact_name: None,
            inventory_id,
            wood_type,
            measurement,
            valuation,
            net_volume,
            unit_price: new.unit_price,
            total_price: net_volume * new.unit_price,
            status: new.status.unwrap_or(SaleStatus::Pending),
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

/// Partial update for a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleUpdate {
    pub status: Option<SaleStatus>,
    pub notes: Option<String>,
    pub unit_price: Option<f64>,
}

impl SaleUpdate {
    pub fn apply(&self, sale: &mut Sale) -> Result<(), KayuError> {
        if let Some(status) = self.status {
            sale.status = status;
        }
        if let Some(notes) = &self.notes {
            sale.notes = Some(notes.clone());
        }
        if let Some(price) = self.unit_price {
            if !price.is_finite() || price < 0.0 {
                return Err(KayuError::ValidationError(format!(
                    "Unit price must be a non-negative number, got {price}"
                )));
            }
            sale.unit_price = price;
            sale.total_price = sale.net_volume * price;
        }
        sale.updated_at = Utc::now();
        Ok(())
    }
}
