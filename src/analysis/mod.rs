mod dashboard;
mod reporter;
mod reports;

pub use dashboard::{
    compute_dashboard, ActivityEntry, ActivityKind, DashboardStats, WoodTypeStock,
    RECENT_PER_KIND,
};
pub use reporter::{ReportBundle, Reporter};
pub use reports::{
    cash_flow, expense_breakdown, profit_loss, profit_loss_total, CashFlowRow, CategoryTotal,
    Period, ProfitLossRow,
};
