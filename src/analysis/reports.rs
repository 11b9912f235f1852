use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::KayuError;
use crate::models::{Snapshot, TransactionKind};

/// Reporting granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    /// Bucket key for a date: `YYYY-MM` or `YYYY`.
    pub fn key(&self, date: NaiveDate) -> String {
        match self {
            Period::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Period::Yearly => format!("{:04}", date.year()),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Monthly => write!(f, "monthly"),
            Period::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Period::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(Period::Yearly),
            _ => Err(KayuError::ParseError(format!(
                "Unknown period: '{s}' (expected monthly or yearly)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfitLossRow {
    pub period: String,
    pub revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub expenses: f64,
    pub net_profit: f64,
    /// Net profit as a percentage of revenue; 0 when there is no revenue.
    pub net_margin_percent: f64,
}

impl ProfitLossRow {
    fn finish(mut self) -> Self {
        self.gross_profit = self.revenue - self.cogs;
        self.net_profit = self.gross_profit - self.expenses;
        self.net_margin_percent = if self.revenue > 0.0 {
            self.net_profit / self.revenue * 100.0
        } else {
            0.0
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub period: String,
    pub inflow: f64,
    pub outflow: f64,
    pub net: f64,
    /// Running sum of `net` up to and including this period.
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
    pub percent: f64,
}

/// Profit and loss per period, oldest first.
///
/// Revenue counts every sale that is not cancelled. Cost of goods is the
/// purchase value of the stock rows those sales consumed; manual sales carry no
/// cost. Expenses are bucketed by the date the expense was incurred.
pub fn profit_loss(snapshot: &Snapshot, period: Period) -> Vec<ProfitLossRow> {
    let cost_of: HashMap<_, f64> = snapshot
        .inventory
        .iter()
        .map(|item| (item.id, item.total_value))
        .collect();

    let mut buckets: BTreeMap<String, ProfitLossRow> = BTreeMap::new();
    for sale in snapshot.sales.iter().filter(|s| !s.is_cancelled()) {
        let key = period.key(sale.created_at.date_naive());
        let entry = buckets.entry(key.clone()).or_insert_with(|| ProfitLossRow {
            period: key,
            ..Default::default()
        });
        entry.revenue += sale.total_price;
        entry.cogs += sale
            .inventory_id
            .and_then(|id| cost_of.get(&id).copied())
            .unwrap_or(0.0);
    }
    for expense in &snapshot.expenses {
        let key = period.key(expense.date);
        let entry = buckets.entry(key.clone()).or_insert_with(|| ProfitLossRow {
            period: key,
            ..Default::default()
        });
        entry.expenses += expense.amount;
    }

    buckets.into_values().map(ProfitLossRow::finish).collect()
}

/// Sum profit/loss rows into a single `Total` row.
pub fn profit_loss_total(rows: &[ProfitLossRow]) -> ProfitLossRow {
    rows.iter()
        .fold(
            ProfitLossRow {
                period: "Total".to_string(),
                ..Default::default()
            },
            |mut acc, r| {
                acc.revenue += r.revenue;
                acc.cogs += r.cogs;
                acc.expenses += r.expenses;
                acc
            },
        )
        .finish()
}

/// Ledger inflow and outflow per period, oldest first.
pub fn cash_flow(snapshot: &Snapshot, period: Period) -> Vec<CashFlowRow> {
    let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for entry in &snapshot.transactions {
        let bucket = buckets
            .entry(period.key(entry.created_at.date_naive()))
            .or_insert((0.0, 0.0));
        match entry.kind {
            TransactionKind::Income => bucket.0 += entry.amount,
            TransactionKind::Expense => bucket.1 += entry.amount,
        }
    }

    let mut cumulative = 0.0;
    buckets
        .into_iter()
        .map(|(period, (inflow, outflow))| {
            let net = inflow - outflow;
            cumulative += net;
            CashFlowRow {
                period,
                inflow,
                outflow,
                net,
                cumulative,
            }
        })
        .collect()
}

/// Expense totals per category, largest first.
pub fn expense_breakdown(snapshot: &Snapshot) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for expense in &snapshot.expenses {
        let entry = totals.entry(expense.category.as_str()).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }
    let grand_total: f64 = totals.values().map(|(t, _)| t).sum();

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
            percent: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}
