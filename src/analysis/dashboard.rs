use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Snapshot;

/// Entries of each kind shown in the recent-activity feed.
pub const RECENT_PER_KIND: usize = 3;

/// Available stock of one wood type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodTypeStock {
    pub wood_type: String,
    pub logs: usize,
    pub volume: f64,
    pub value: f64,
    pub percent_volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Inventory,
    Sale,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub description: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Net volume (m3) of available logs.
    pub total_stock_volume: f64,
    /// Purchase value of available logs.
    pub total_asset_value: f64,
    pub available_logs: usize,
    pub supplier_debt: f64,
    pub customer_receivables: f64,
    pub total_sales: usize,
    pub total_contacts: usize,
    pub stock_by_type: Vec<WoodTypeStock>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Compute dashboard figures. Only `available` inventory counts as stock.
pub fn compute_dashboard(snapshot: &Snapshot) -> DashboardStats {
    let available: Vec<_> = snapshot
        .inventory
        .iter()
        .filter(|item| item.is_available())
        .collect();

    let total_stock_volume: f64 = available.iter().map(|i| i.valuation.net_volume).sum();
    let total_asset_value: f64 = available.iter().map(|i| i.total_value).sum();

    // wood type -> (logs, volume, value)
    let mut by_type: HashMap<&str, (usize, f64, f64)> = HashMap::new();
    for item in &available {
        let entry = by_type.entry(item.wood_type.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += item.valuation.net_volume;
        entry.2 += item.total_value;
    }
    let mut stock_by_type: Vec<WoodTypeStock> = by_type
        .into_iter()
        .map(|(wood_type, (logs, volume, value))| WoodTypeStock {
            wood_type: wood_type.to_string(),
            logs,
            volume,
            value,
            percent_volume: if total_stock_volume > 0.0 {
                volume / total_stock_volume * 100.0
            } else {
                0.0
            },
        })
        .collect();
    stock_by_type.sort_by(|a, b| {
        b.volume
            .total_cmp(&a.volume)
            .then_with(|| a.wood_type.cmp(&b.wood_type))
    });

    DashboardStats {
        total_stock_volume,
        total_asset_value,
        available_logs: available.len(),
        supplier_debt: snapshot.contacts.iter().map(|c| c.debt()).sum(),
        customer_receivables: snapshot.contacts.iter().map(|c| c.receivable()).sum(),
        total_sales: snapshot.sales.len(),
        total_contacts: snapshot.contacts.len(),
        stock_by_type,
        recent_activity: recent_activity(snapshot),
    }
}

fn recent_activity(snapshot: &Snapshot) -> Vec<ActivityEntry> {
    let mut inventory: Vec<_> = snapshot.inventory.iter().collect();
    inventory.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut sales: Vec<_> = snapshot.sales.iter().collect();
    sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut expenses: Vec<_> = snapshot.expenses.iter().collect();
    expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut feed: Vec<ActivityEntry> = Vec::new();
    feed.extend(inventory.into_iter().take(RECENT_PER_KIND).map(|i| ActivityEntry {
        kind: ActivityKind::Inventory,
        description: format!(
            "{} log {} ({:.4} m3)",
            i.wood_type, i.invoice_number, i.valuation.net_volume
        ),
        amount: i.total_value,
        timestamp: i.created_at,
    }));
    feed.extend(sales.into_iter().take(RECENT_PER_KIND).map(|s| ActivityEntry {
        kind: ActivityKind::Sale,
        description: format!(
            "Sale {}{}",
            s.invoice_number,
            s.contact_name
                .as_deref()
                .map(|n| format!(" to {n}"))
                .unwrap_or_default()
        ),
        amount: s.total_price,
        timestamp: s.created_at,
    }));
    feed.extend(expenses.into_iter().take(RECENT_PER_KIND).map(|e| ActivityEntry {
        kind: ActivityKind::Expense,
        description: match &e.description {
            Some(d) => format!("{}: {d}", e.category),
            None => e.category.clone(),
        },
        amount: e.amount,
        timestamp: e.created_at,
    }));
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed
}
