use serde::Serialize;

use crate::analysis::{
    cash_flow, compute_dashboard, expense_breakdown, profit_loss, profit_loss_total, CashFlowRow,
    CategoryTotal, DashboardStats, Period, ProfitLossRow,
};
use crate::models::Snapshot;

/// Every report for one period, as written to the XLSX export.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub period: Period,
    pub profit_loss: Vec<ProfitLossRow>,
    pub profit_loss_total: ProfitLossRow,
    pub cash_flow: Vec<CashFlowRow>,
    pub expenses: Vec<CategoryTotal>,
}

/// Groups all reporting operations over one loaded snapshot.
pub struct Reporter<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Reporter<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn dashboard(&self) -> DashboardStats {
        compute_dashboard(self.snapshot)
    }

    pub fn profit_loss(&self, period: Period) -> Vec<ProfitLossRow> {
        profit_loss(self.snapshot, period)
    }

    pub fn cash_flow(&self, period: Period) -> Vec<CashFlowRow> {
        cash_flow(self.snapshot, period)
    }

    pub fn expense_breakdown(&self) -> Vec<CategoryTotal> {
        expense_breakdown(self.snapshot)
    }

    /// Compute every report for `period` in one go.
    pub fn bundle(&self, period: Period) -> ReportBundle {
        let pl = self.profit_loss(period);
        ReportBundle {
            period,
            profit_loss_total: profit_loss_total(&pl),
            profit_loss: pl,
            cash_flow: self.cash_flow(period),
            expenses: self.expense_breakdown(),
        }
    }
}
