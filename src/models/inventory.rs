use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::valuation::{
    price_batch, PricedLog, ValidationIssue, WoodLogMeasurement, WoodLogValuation,
};
use crate::error::KayuError;

/// Wood types the yard normally handles. Other names are accepted as-is.
pub const KNOWN_WOOD_TYPES: [&str; 6] = ["Jati", "Mahoni", "Meranti", "Kamper", "Sengon", "Akasia"];

/// Stock status of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryStatus {
    Available,
    Sold,
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryStatus::Available => write!(f, "available"),
            InventoryStatus::Sold => write!(f, "sold"),
        }
    }
}

impl std::str::FromStr for InventoryStatus {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" | "a" => Ok(InventoryStatus::Available),
            "sold" | "s" => Ok(InventoryStatus::Sold),
            _ => Err(KayuError::ParseError(format!(
                "Unknown inventory status: '{s}'"
            ))),
        }
    }
}

/// One log in stock, with its measurements and stamped purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub invoice_number: String,
    pub contact_id: Option<Uuid>,
    /// Supplier name, filled from the contacts table on read.
    #[serde(default)]
    pub contact_name: Option<String>,
    pub wood_type: String,
    #[serde(flatten)]
    pub measurement: WoodLogMeasurement,
    #[serde(flatten)]
    pub valuation: WoodLogValuation,
    /// Purchase price per cubic unit, fixed at intake.
    pub unit_price: f64,
    pub total_value: f64,
    pub status: InventoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_available(&self) -> bool {
        self.status == InventoryStatus::Available
    }

    /// Build a fresh stock row from a priced log.
    pub fn from_priced(
        priced: &PricedLog,
        invoice_number: &str,
        contact_id: Option<Uuid>,
        wood_type: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            invoice_number: invoice_number.to_string(),
            contact_id,
            contact_name: None,
            wood_type: wood_type.to_string(),
            measurement: priced.measurement,
            valuation: priced.valuation,
            unit_price: priced.unit_price,
            total_value: priced.total_value,
            status: InventoryStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A purchase invoice with the logs delivered under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIntake {
    pub invoice_number: String,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    pub wood_type: String,
    pub total_invoice_price: f64,
    pub logs: Vec<WoodLogMeasurement>,
}

impl BatchIntake {
    fn header_issues(&self) -> Vec<ValidationIssue> {
        let header = |field: &str, message: String| ValidationIssue {
            row_index: 0,
            field: field.to_string(),
            message,
        };
        let mut issues = Vec::new();
        if self.invoice_number.trim().is_empty() {
            issues.push(header(
                "invoice_number",
                "Invoice number must not be empty".to_string(),
            ));
        }
        if self.wood_type.trim().is_empty() {
            issues.push(header("wood_type", "Wood type must not be empty".to_string()));
        }
        if !self.total_invoice_price.is_finite() || self.total_invoice_price < 0.0 {
            issues.push(header(
                "total_invoice_price",
                format!(
                    "Total invoice price must be a non-negative number, got {}",
                    self.total_invoice_price
                ),
            ));
        }
        if self.logs.is_empty() {
            issues.push(header("logs", "A batch needs at least one log".to_string()));
        }
        issues
    }

    /// Collect every problem with the header and the logs. Header issues
    /// come first and carry row index 0.
    pub fn validate_all(&self) -> Vec<ValidationIssue> {
        let mut issues = self.header_issues();
        for (i, log) in self.logs.iter().enumerate() {
            issues.extend(log.validate_all(i));
        }
        issues
    }

    /// Fail on the first problem. Only per-log issues get a `Log N:` prefix.
    pub fn validate(&self) -> Result<(), KayuError> {
        if let Some(issue) = self.header_issues().into_iter().next() {
            return Err(KayuError::ValidationError(issue.message));
        }
        let first_log_issue = self
            .logs
            .iter()
            .enumerate()
            .find_map(|(i, log)| log.validate_all(i).into_iter().next());
        match first_log_issue {
            Some(issue) => Err(KayuError::ValidationError(format!(
                "Log {}: {}",
                issue.row_index + 1,
                issue.message
            ))),
            None => Ok(()),
        }
    }

    /// Price the batch and build the stock rows it produces.
    pub fn to_items(&self) -> Vec<InventoryItem> {
        price_batch(&self.logs, self.total_invoice_price)
            .iter()
            .map(|p| {
                InventoryItem::from_priced(
                    p,
                    &self.invoice_number,
                    self.contact_id,
                    &self.wood_type,
                )
            })
            .collect()
    }
}

/// Partial update for a stock row. Status is not editable here; only the
/// sale lifecycle moves a log between `available` and `sold`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryUpdate {
    pub invoice_number: Option<String>,
    pub contact_id: Option<Uuid>,
    pub wood_type: Option<String>,
    pub unit_price: Option<f64>,
    /// Replacing the measurement re-runs the valuation.
    pub measurement: Option<WoodLogMeasurement>,
}

impl InventoryUpdate {
    pub fn apply(&self, item: &mut InventoryItem) -> Result<(), KayuError> {
        if let Some(m) = &self.measurement {
            m.validate()?;
            item.measurement = *m;
            item.valuation = m.valuate();
        }
        if let Some(invoice) = &self.invoice_number {
            item.invoice_number = invoice.clone();
        }
        if let Some(id) = self.contact_id {
            item.contact_id = Some(id);
        }
        if let Some(wood_type) = &self.wood_type {
            item.wood_type = wood_type.clone();
        }
        if let Some(price) = self.unit_price {
            if !price.is_finite() || price < 0.0 {
                return Err(KayuError::ValidationError(format!(
                    "Unit price must be a non-negative number, got {price}"
                )));
            }
            item.unit_price = price;
        }
        item.total_value = item.valuation.net_volume * item.unit_price;
        item.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> BatchIntake {
        BatchIntake {
            invoice_number: "INV-2024-001".to_string(),
            contact_id: None,
            wood_type: "Jati".to_string(),
            total_invoice_price: 5_000_000.0,
            logs: vec![
                WoodLogMeasurement::new(400.0, 42.0, 44.0, 43.0, 45.0).with_trim(10.0),
                WoodLogMeasurement::new(380.0, 40.0, 41.0, 42.0, 43.0).with_gr(5.0),
            ],
        }
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(InventoryStatus::Available.to_string(), "available");
        assert_eq!("SOLD".parse::<InventoryStatus>().unwrap(), InventoryStatus::Sold);
        assert!("reserved".parse::<InventoryStatus>().is_err());
    }

    #[test]
    fn test_batch_to_items_share_invoice_and_price() {
        let items = sample_batch().to_items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.invoice_number == "INV-2024-001"));
        assert!(items.iter().all(|i| i.is_available()));
        assert_eq!(items[0].unit_price, items[1].unit_price);
        let total: f64 = items.iter().map(|i| i.total_value).sum();
        assert!((total - 5_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_validation_reports_log_rows() {
        let mut batch = sample_batch();
        batch.logs[1].trim = 500.0;
        let issues = batch.validate_all();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row_index, 1);
        let err = batch.validate().unwrap_err();
        assert!(err.to_string().contains("Log 2"));
    }

    #[test]
    fn test_batch_validation_empty() {
        let batch = BatchIntake {
            invoice_number: String::new(),
            contact_id: None,
            wood_type: "Jati".to_string(),
            total_invoice_price: -1.0,
            logs: vec![],
        };
        let fields: Vec<String> = batch.validate_all().into_iter().map(|i| i.field).collect();
        assert!(fields.contains(&"invoice_number".to_string()));
        assert!(fields.contains(&"total_invoice_price".to_string()));
        assert!(fields.contains(&"logs".to_string()));

        let err = batch.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Invoice number must not be empty");
    }

    #[test]
    fn test_update_rejects_status_field() {
        let json = r#"{"wood_type": "Mahoni", "status": "available"}"#;
        assert!(serde_json::from_str::<InventoryUpdate>(json).is_err());
        let update: InventoryUpdate = serde_json::from_str(r#"{"wood_type": "Mahoni"}"#).unwrap();
        assert_eq!(update.wood_type.as_deref(), Some("Mahoni"));
    }

    #[test]
    fn test_update_new_measurement_revaluates() {
        let mut item = sample_batch().to_items().remove(0);
        let old_net = item.valuation.net_volume;
        let update = InventoryUpdate {
            measurement: Some(WoodLogMeasurement::new(200.0, 30.0, 30.0, 30.0, 30.0)),
            ..Default::default()
        };
        update.apply(&mut item).unwrap();
        assert_ne!(item.valuation.net_volume, old_net);
        assert_eq!(item.total_value, item.valuation.net_volume * item.unit_price);
    }

    #[test]
    fn test_update_unit_price_recomputes_value() {
        let mut item = sample_batch().to_items().remove(0);
        let update = InventoryUpdate {
            unit_price: Some(100.0),
            ..Default::default()
        };
        update.apply(&mut item).unwrap();
        assert_eq!(item.total_value, item.valuation.net_volume * 100.0);
    }

    #[test]
    fn test_update_rejects_bad_measurement() {
        let mut item = sample_batch().to_items().remove(0);
        let update = InventoryUpdate {
            measurement: Some(
                WoodLogMeasurement::new(100.0, 30.0, 30.0, 30.0, 30.0).with_trim(200.0),
            ),
            ..Default::default()
        };
        assert!(update.apply(&mut item).is_err());
    }

    #[test]
    fn test_item_json_is_flat() {
        let item = sample_batch().to_items().remove(0);
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("net_volume").is_some());
        assert!(value.get("d1").is_some());
        assert_eq!(value["status"], "available");
    }
}
