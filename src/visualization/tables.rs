use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table,
};

use crate::analysis::{CashFlowRow, CategoryTotal, DashboardStats, ProfitLossRow};
use crate::models::{InventoryItem, PricedLog, User};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn title(output: &mut String, text: &str, width: usize) {
    output.push_str(&format!("\n{}\n", text.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(width)));
}

/// Money with thousands separators and no decimals, e.g. `1,250,000`.
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a priced batch of logs as a string.
pub fn format_valuation_table(logs: &[PricedLog]) -> String {
    let mut output = String::new();
    title(&mut output, "Log Valuation", 70);

    let mut table = new_table(vec![
        "#", "Length", "Avg D", "Trim", "GR", "Gross m3", "GR m3", "Net m3", "Value",
    ]);
    for (i, log) in logs.iter().enumerate() {
        let m = &log.measurement;
        let v = &log.valuation;
        let net = if v.net_volume < 0.0 {
            Cell::new(format!("{:.4}", v.net_volume)).fg(comfy_table::Color::Red)
        } else {
            Cell::new(format!("{:.4}", v.net_volume))
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:.1}", m.length)),
            Cell::new(format!("{:.2}", v.avg_diameter)),
            Cell::new(format!("{:.1}", m.trim)),
            Cell::new(format!("{:.1}", m.gr)),
            Cell::new(format!("{:.4}", v.gross_volume)),
            Cell::new(format!("{:.4}", v.gr_volume)),
            net,
            Cell::new(format_money(log.total_value)),
        ]);
    }

    let total_volume: f64 = logs.iter().map(|l| l.valuation.net_volume).sum();
    let total_value: f64 = logs.iter().map(|l| l.total_value).sum();
    output.push_str(&format!("{table}\n"));
    output.push_str(&format!(
        "  Logs: {}  |  Net volume: {:.4} m3  |  Value: {}\n",
        logs.len(),
        total_volume,
        format_money(total_value)
    ));
    if let Some(first) = logs.first() {
        output.push_str(&format!(
            "  {}\n",
            format!("Unit price: {} per m3", format_money(first.unit_price)).dimmed()
        ));
    }
    output
}

/// Print a priced batch of logs.
pub fn print_valuation_table(logs: &[PricedLog]) {
    print!("{}", format_valuation_table(logs));
}

/// Format the inventory list as a string.
pub fn format_inventory_table(items: &[InventoryItem]) -> String {
    let mut output = String::new();
    title(&mut output, "Inventory", 70);

    if items.is_empty() {
        output.push_str("  No inventory recorded.\n");
        return output;
    }

    let mut table = new_table(vec![
        "Invoice", "Supplier", "Wood", "Length", "Avg D", "Net m3", "Value", "Status",
    ]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.invoice_number),
            Cell::new(item.contact_name.as_deref().unwrap_or("-")),
            Cell::new(&item.wood_type),
            Cell::new(format!("{:.1}", item.measurement.length)),
            Cell::new(format!("{:.2}", item.valuation.avg_diameter)),
            Cell::new(format!("{:.4}", item.valuation.net_volume)),
            Cell::new(format_money(item.total_value)),
            Cell::new(item.status),
        ]);
    }
    output.push_str(&format!("{table}"));
    output
}

pub fn print_inventory_table(items: &[InventoryItem]) {
    print!("{}", format_inventory_table(items));
}

/// Format the dashboard headline figures as a string.
pub fn format_dashboard(stats: &DashboardStats) -> String {
    let mut output = String::new();
    title(&mut output, "Dashboard", 50);

    let mut table = new_table(vec!["Metric", "Value", "Unit"]);
    table.add_row(vec![
        Cell::new("Stock Volume"),
        Cell::new(format!("{:.4}", stats.total_stock_volume)),
        Cell::new("m3"),
    ]);
    table.add_row(vec![
        Cell::new("Asset Value"),
        Cell::new(format_money(stats.total_asset_value)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Available Logs"),
        Cell::new(stats.available_logs),
        Cell::new("logs"),
    ]);
    table.add_row(vec![
        Cell::new("Supplier Debt"),
        Cell::new(format_money(stats.supplier_debt)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Customer Receivables"),
        Cell::new(format_money(stats.customer_receivables)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Sales"),
        Cell::new(stats.total_sales),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Contacts"),
        Cell::new(stats.total_contacts),
        Cell::new(""),
    ]);
    output.push_str(&format!("{table}\n"));

    if !stats.recent_activity.is_empty() {
        output.push_str(&format!("\n{}\n", "Recent Activity".bold()));
        for entry in &stats.recent_activity {
            output.push_str(&format!(
                "  {}  {:<9} {:<40} {:>14}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                format!("{:?}", entry.kind).to_lowercase(),
                entry.description,
                format_money(entry.amount)
            ));
        }
    }
    output
}

pub fn print_dashboard(stats: &DashboardStats) {
    print!("{}", format_dashboard(stats));
}

/// Format a profit and loss statement, with a totals row when given.
pub fn format_profit_loss_table(rows: &[ProfitLossRow], total: Option<&ProfitLossRow>) -> String {
    let mut output = String::new();
    title(&mut output, "Profit & Loss", 80);

    if rows.is_empty() {
        output.push_str("  No activity in any period.\n");
        return output;
    }

    let mut table = new_table(vec![
        "Period", "Revenue", "COGS", "Gross Profit", "Expenses", "Net Profit", "Margin %",
    ]);
    let money_row = |row: &ProfitLossRow, bold: bool| {
        let net = Cell::new(format_money(row.net_profit));
        let net = if row.net_profit < 0.0 {
            net.fg(comfy_table::Color::Red)
        } else {
            net
        };
        let period = if bold {
            Cell::new(&row.period).add_attribute(comfy_table::Attribute::Bold)
        } else {
            Cell::new(&row.period)
        };
        vec![
            period,
            Cell::new(format_money(row.revenue)),
            Cell::new(format_money(row.cogs)),
            Cell::new(format_money(row.gross_profit)),
            Cell::new(format_money(row.expenses)),
            net,
            Cell::new(format!("{:.1}%", row.net_margin_percent)),
        ]
    };
    for row in rows {
        table.add_row(money_row(row, false));
    }
    if let Some(total) = total {
        table.add_row(money_row(total, true));
    }
    output.push_str(&format!("{table}"));
    output
}

pub fn print_profit_loss_table(rows: &[ProfitLossRow], total: Option<&ProfitLossRow>) {
    print!("{}", format_profit_loss_table(rows, total));
}

/// Format the cash-flow table as a string.
pub fn format_cash_flow_table(rows: &[CashFlowRow]) -> String {
    let mut output = String::new();
    title(&mut output, "Cash Flow", 70);

    if rows.is_empty() {
        output.push_str("  No transactions recorded.\n");
        return output;
    }

    let mut table = new_table(vec!["Period", "Inflow", "Outflow", "Net", "Cumulative"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.period),
            Cell::new(format_money(row.inflow)),
            Cell::new(format_money(row.outflow)),
            Cell::new(format_money(row.net)),
            Cell::new(format_money(row.cumulative)),
        ]);
    }
    output.push_str(&format!("{table}"));
    output
}

pub fn print_cash_flow_table(rows: &[CashFlowRow]) {
    print!("{}", format_cash_flow_table(rows));
}

/// Format expense totals per category as a string.
pub fn format_expense_table(rows: &[CategoryTotal]) -> String {
    let mut output = String::new();
    title(&mut output, "Expenses by Category", 60);

    let mut table = new_table(vec!["Category", "Entries", "Total", "% of Total"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(row.count),
            Cell::new(format_money(row.total)),
            Cell::new(format!("{:.1}%", row.percent)),
        ]);
    }
    output.push_str(&format!("{table}"));
    output
}

pub fn print_expense_table(rows: &[CategoryTotal]) {
    print!("{}", format_expense_table(rows));
}

/// Format the user list as a string. Password hashes are never shown.
pub fn format_user_table(users: &[User]) -> String {
    let mut output = String::new();
    title(&mut output, "Users", 60);

    let mut table = new_table(vec!["Email", "Name", "Role", "Status", "Last Login"]);
    for user in users {
        table.add_row(vec![
            Cell::new(&user.email),
            Cell::new(&user.name),
            Cell::new(user.role),
            Cell::new(user.status),
            Cell::new(
                user.last_login_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            ),
        ]);
    }
    output.push_str(&format!("{table}"));
    output
}

pub fn print_user_table(users: &[User]) {
    print!("{}", format_user_table(users));
}
