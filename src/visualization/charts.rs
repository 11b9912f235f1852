use colored::Colorize;

use crate::analysis::{CategoryTotal, WoodTypeStock};

const BAR_WIDTH: usize = 40;

fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    "\u{2588}".repeat(len)
}

/// Format a text bar chart of available stock volume per wood type.
pub fn format_stock_chart(stock: &[WoodTypeStock]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Stock by Wood Type".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if stock.is_empty() {
        output.push_str("  No stock available.\n");
        return output;
    }

    let max_volume = stock.iter().map(|s| s.volume).fold(0.0f64, f64::max);

    output.push_str(&format!(
        "  {:<12}  {:>6}  {:>10}  {:>6}  Distribution\n",
        "Wood", "Logs", "Net m3", "%"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(80)));

    for s in stock {
        output.push_str(&format!(
            "  {:<12}  {:>6}  {:>10.4}  {:>5.1}%  {}\n",
            s.wood_type,
            s.logs,
            s.volume,
            s.percent_volume,
            bar(s.volume, max_volume).green()
        ));
    }

    output.push('\n');
    output
}

pub fn print_stock_chart(stock: &[WoodTypeStock]) {
    print!("{}", format_stock_chart(stock));
}

/// Format a text bar chart of expense totals per category.
pub fn format_expense_chart(rows: &[CategoryTotal]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Expense Distribution".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if rows.is_empty() {
        output.push_str("  No expenses recorded.\n");
        return output;
    }

    let max_total = rows.iter().map(|r| r.total).fold(0.0f64, f64::max);
    for row in rows {
        output.push_str(&format!(
            "  {:<16}  {:>5.1}%  {}\n",
            row.category,
            row.percent,
            bar(row.total, max_total).yellow()
        ));
    }

    output.push('\n');
    output
}

pub fn print_expense_chart(rows: &[CategoryTotal]) {
    print!("{}", format_expense_chart(rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(wood_type: &str, logs: usize, volume: f64, percent_volume: f64) -> WoodTypeStock {
        WoodTypeStock {
            wood_type: wood_type.to_string(),
            logs,
            volume,
            value: volume * 1_000_000.0,
            percent_volume,
        }
    }

    #[test]
    fn test_stock_chart_empty() {
        let output = format_stock_chart(&[]);
        assert!(output.contains("Stock by Wood Type"));
        assert!(output.contains("No stock available."));
    }

    #[test]
    fn test_stock_chart_with_data() {
        let output =
            format_stock_chart(&[stock("Jati", 4, 2.5, 62.5), stock("Mahoni", 2, 1.5, 37.5)]);
        assert!(output.contains("Jati"));
        assert!(output.contains("Mahoni"));
        assert!(output.contains("2.5000"));
        assert!(output.contains("62.5%"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).chars().count(), BAR_WIDTH / 2);
        assert!(bar(0.0, 0.0).is_empty());
        assert!(bar(-1.0, 10.0).is_empty());
    }

    #[test]
    fn test_expense_chart() {
        let rows = vec![CategoryTotal {
            category: "Fuel".to_string(),
            total: 300_000.0,
            count: 3,
            percent: 100.0,
        }];
        let output = format_expense_chart(&rows);
        assert!(output.contains("Fuel"));
        assert!(output.contains("100.0%"));
        assert!(format_expense_chart(&[]).contains("No expenses recorded."));
    }
}
