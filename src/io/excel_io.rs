use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::analysis::ReportBundle;
use crate::error::KayuError;
use crate::models::{ValidationIssue, WoodLogMeasurement};

use super::{check_rows, collect_rows, LogRow};

/// Column positions of a log sheet, found from its header row.
struct Columns {
    length: usize,
    d: [usize; 4],
    trim: Option<usize>,
    gr: Option<usize>,
}

impl Columns {
    fn from_header(header: &[Data]) -> Result<Self, KayuError> {
        let names: Vec<String> = header
            .iter()
            .map(|c| c.to_string().trim().to_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                KayuError::ParseError(format!("Log sheet is missing column '{name}'"))
            })
        };
        Ok(Self {
            length: require("length")?,
            d: [require("d1")?, require("d2")?, require("d3")?, require("d4")?],
            trim: find("trim"),
            gr: find("gr"),
        })
    }
}

fn cell_f64(row: &[Data], idx: usize, line: usize, name: &str) -> Result<Option<f64>, KayuError> {
    match row.get(idx) {
        None | Some(Data::Empty) => Ok(None),
        Some(cell) => cell.as_f64().map(Some).ok_or_else(|| {
            KayuError::ParseError(format!(
                "Row {line}: column '{name}' is not a number ('{cell}')"
            ))
        }),
    }
}

fn required_f64(row: &[Data], idx: usize, line: usize, name: &str) -> Result<f64, KayuError> {
    cell_f64(row, idx, line, name)?
        .ok_or_else(|| KayuError::ParseError(format!("Row {line}: column '{name}' is empty")))
}

/// Read raw log rows from the first sheet of a workbook.
fn parse_workbook(path: &Path) -> Result<Vec<LogRow>, KayuError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| KayuError::Excel("No sheets found in workbook".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| KayuError::ParseError("Log sheet is empty".to_string()))?;
    let cols = Columns::from_header(header)?;

    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let line = i + 1;
        out.push(LogRow {
            length: required_f64(row, cols.length, line, "length")?,
            d1: required_f64(row, cols.d[0], line, "d1")?,
            d2: required_f64(row, cols.d[1], line, "d2")?,
            d3: required_f64(row, cols.d[2], line, "d3")?,
            d4: required_f64(row, cols.d[3], line, "d4")?,
            trim: match cols.trim {
                Some(idx) => cell_f64(row, idx, line, "trim")?,
                None => None,
            },
            gr: match cols.gr {
                Some(idx) => cell_f64(row, idx, line, "gr")?,
                None => None,
            },
        });
    }
    Ok(out)
}

fn with_temp_file<T>(
    data: &[u8],
    f: impl FnOnce(&Path) -> Result<T, KayuError>,
) -> Result<T, KayuError> {
    use std::io::Write;
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(data)?;
    tmp.flush()?;
    f(tmp.path())
}

/// Read a log sheet from the first worksheet of an `.xlsx` file.
///
/// The first row is a header naming `length, d1, d2, d3, d4` and optionally
/// `trim` and `gr`, in any order.
pub fn read_log_sheet_excel(path: impl AsRef<Path>) -> Result<Vec<WoodLogMeasurement>, KayuError> {
    check_rows(parse_workbook(path.as_ref())?)
}

pub fn read_log_sheet_excel_from_bytes(data: &[u8]) -> Result<Vec<WoodLogMeasurement>, KayuError> {
    with_temp_file(data, |path| check_rows(parse_workbook(path)?))
}

/// Parse an `.xlsx` log sheet leniently: every row plus every validation issue.
pub(crate) fn parse_log_sheet_excel_lenient(
    data: &[u8],
) -> Result<(Vec<WoodLogMeasurement>, Vec<ValidationIssue>), KayuError> {
    with_temp_file(data, |path| Ok(collect_rows(parse_workbook(path)?)))
}

fn write_header(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), KayuError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }
    Ok(())
}

fn build_report_workbook(bundle: &ReportBundle, company: &str) -> Result<Workbook, KayuError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let percent = Format::new().set_num_format("0.00");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Profit & Loss")?;
        write_header(
            sheet,
            &[
                "Period",
                "Revenue",
                "COGS",
                "Gross Profit",
                "Expenses",
                "Net Profit",
                "Net Margin %",
            ],
            &bold,
        )?;
        let all = bundle
            .profit_loss
            .iter()
            .chain(std::iter::once(&bundle.profit_loss_total));
        for (i, row) in all.enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.period)?;
            sheet.write_number_with_format(r, 1, row.revenue, &money)?;
            sheet.write_number_with_format(r, 2, row.cogs, &money)?;
            sheet.write_number_with_format(r, 3, row.gross_profit, &money)?;
            sheet.write_number_with_format(r, 4, row.expenses, &money)?;
            sheet.write_number_with_format(r, 5, row.net_profit, &money)?;
            sheet.write_number_with_format(r, 6, row.net_margin_percent, &percent)?;
        }
        let footer = bundle.profit_loss.len() as u32 + 3;
        sheet.write_string(footer, 0, format!("{company} ({} report)", bundle.period))?;
        sheet.set_column_width(0, 14)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Cash Flow")?;
        write_header(sheet, &["Period", "Inflow", "Outflow", "Net", "Cumulative"], &bold)?;
        for (i, row) in bundle.cash_flow.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.period)?;
            sheet.write_number_with_format(r, 1, row.inflow, &money)?;
            sheet.write_number_with_format(r, 2, row.outflow, &money)?;
            sheet.write_number_with_format(r, 3, row.net, &money)?;
            sheet.write_number_with_format(r, 4, row.cumulative, &money)?;
        }
        sheet.set_column_width(0, 14)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Expenses")?;
        write_header(sheet, &["Category", "Entries", "Total", "Share %"], &bold)?;
        for (i, row) in bundle.expenses.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.category)?;
            sheet.write_number(r, 1, row.count as f64)?;
            sheet.write_number_with_format(r, 2, row.total, &money)?;
            sheet.write_number_with_format(r, 3, row.percent, &percent)?;
        }
        sheet.set_column_width(0, 20)?;
    }

    Ok(workbook)
}

/// Write the profit & loss, cash flow and expense reports as one workbook.
pub fn write_report_excel(
    bundle: &ReportBundle,
    company: &str,
    path: impl AsRef<Path>,
) -> Result<(), KayuError> {
    let mut workbook = build_report_workbook(bundle, company)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

/// The report workbook as `.xlsx` bytes.
pub fn report_excel_bytes(bundle: &ReportBundle, company: &str) -> Result<Vec<u8>, KayuError> {
    let mut workbook = build_report_workbook(bundle, company)?;
    Ok(workbook.save_to_buffer()?)
}
