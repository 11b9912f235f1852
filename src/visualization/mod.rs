mod tables;
mod charts;

pub use tables::{
    format_money,
    format_valuation_table, print_valuation_table,
    format_inventory_table, print_inventory_table,
    format_dashboard, print_dashboard,
    format_profit_loss_table, print_profit_loss_table,
    format_cash_flow_table, print_cash_flow_table,
    format_expense_table, print_expense_table,
    format_user_table, print_user_table,
};
pub use charts::{
    format_stock_chart, print_stock_chart,
    format_expense_chart, print_expense_chart,
};
