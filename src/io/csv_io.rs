use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::KayuError;
use crate::models::{InventoryItem, Sale, ValidationIssue, WoodLogMeasurement};

use super::{check_rows, LogRow};

fn log_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

fn parse_log_rows<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<LogRow>, KayuError> {
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: LogRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read a log sheet (`length,d1,d2,d3,d4[,trim][,gr]`) from a CSV file.
/// Fails on the first invalid measurement.
pub fn read_log_sheet_csv(path: impl AsRef<Path>) -> Result<Vec<WoodLogMeasurement>, KayuError> {
    let file = std::fs::File::open(path.as_ref())?;
    let rows = parse_log_rows(&mut log_reader(file))?;
    check_rows(rows)
}

/// Read a log sheet from CSV bytes, failing on the first invalid measurement.
pub fn read_log_sheet_csv_from_bytes(data: &[u8]) -> Result<Vec<WoodLogMeasurement>, KayuError> {
    let rows = parse_log_rows(&mut log_reader(data))?;
    check_rows(rows)
}

/// Parse a CSV log sheet leniently: every row plus every validation issue.
///
/// Format errors (missing columns, non-numeric cells) are still fatal.
pub(crate) fn parse_log_sheet_csv_lenient(
    data: &[u8],
) -> Result<(Vec<WoodLogMeasurement>, Vec<ValidationIssue>), KayuError> {
    let rows = parse_log_rows(&mut log_reader(data))?;
    Ok(super::collect_rows(rows))
}

/// One line of the inventory export.
#[derive(Debug, Serialize)]
struct InventoryCsvRow<'a> {
    id: String,
    invoice_number: &'a str,
    supplier: &'a str,
    wood_type: &'a str,
    length: f64,
    d1: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    trim: f64,
    gr: f64,
    avg_diameter: f64,
    gross_volume: f64,
    net_volume: f64,
    unit_price: f64,
    total_value: f64,
    status: String,
    created_at: String,
}

fn write_inventory<W: Write>(items: &[InventoryItem], out: W) -> Result<(), KayuError> {
    let mut wtr = csv::Writer::from_writer(out);
    for item in items {
        let m = &item.measurement;
        wtr.serialize(InventoryCsvRow {
            id: item.id.to_string(),
            invoice_number: &item.invoice_number,
            supplier: item.contact_name.as_deref().unwrap_or(""),
            wood_type: &item.wood_type,
            length: m.length,
            d1: m.d1,
            d2: m.d2,
            d3: m.d3,
            d4: m.d4,
            trim: m.trim,
            gr: m.gr,
            avg_diameter: item.valuation.avg_diameter,
            gross_volume: item.valuation.gross_volume,
            net_volume: item.valuation.net_volume,
            unit_price: item.unit_price,
            total_value: item.total_value,
            status: item.status.to_string(),
            created_at: item.created_at.to_rfc3339(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the inventory list to a CSV file.
pub fn write_inventory_csv(
    items: &[InventoryItem],
    path: impl AsRef<Path>,
) -> Result<(), KayuError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_inventory(items, file)
}

/// The inventory list as CSV bytes.
pub fn inventory_csv_bytes(items: &[InventoryItem]) -> Result<Vec<u8>, KayuError> {
    let mut buf = Vec::new();
    write_inventory(items, &mut buf)?;
    Ok(buf)
}

#[derive(Debug, Serialize)]
struct SaleCsvRow<'a> {
    id: String,
    invoice_number: &'a str,
    customer: &'a str,
    wood_type: &'a str,
    net_volume: f64,
    unit_price: f64,
    total_price: f64,
    status: String,
    notes: &'a str,
    created_at: String,
}

fn write_sales<W: Write>(sales: &[Sale], out: W) -> Result<(), KayuError> {
    let mut wtr = csv::Writer::from_writer(out);
    for sale in sales {
        wtr.serialize(SaleCsvRow {
            id: sale.id.to_string(),
            invoice_number: &sale.invoice_number,
            customer: sale.contact_name.as_deref().unwrap_or(""),
            wood_type: sale.wood_type.as_deref().unwrap_or(""),
            net_volume: sale.net_volume,
            unit_price: sale.unit_price,
            total_price: sale.total_price,
            status: sale.status.to_string(),
            notes: sale.notes.as_deref().unwrap_or(""),
            created_at: sale.created_at.to_rfc3339(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the sales list to a CSV file.
pub fn write_sales_csv(sales: &[Sale], path: impl AsRef<Path>) -> Result<(), KayuError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_sales(sales, file)
}

/// The sales list as CSV bytes.
pub fn sales_csv_bytes(sales: &[Sale]) -> Result<Vec<u8>, KayuError> {
    let mut buf = Vec::new();
    write_sales(sales, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatchIntake;

    const SHEET: &str = "length,d1,d2,d3,d4,trim,gr
400,42,44,43,45,10,
380,40,41,42,43,,5
300,30,30,30,30,0,0
";

    #[test]
    fn test_read_with_optional_columns() {
        let logs = read_log_sheet_csv_from_bytes(SHEET.as_bytes()).unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].trim, 10.0);
        assert_eq!(logs[0].gr, 0.0);
        assert_eq!(logs[1].trim, 0.0);
        assert_eq!(logs[1].gr, 5.0);
    }

    #[test]
    fn test_read_without_trim_gr_columns() {
        let data = "length,d1,d2,d3,d4\n400,40,40,40,40\n";
        let logs = read_log_sheet_csv_from_bytes(data.as_bytes()).unwrap();
        assert_eq!(logs, vec![WoodLogMeasurement::new(400.0, 40.0, 40.0, 40.0, 40.0)]);
    }

    #[test]
    fn test_strict_fails_on_invalid_row() {
        let data = "length,d1,d2,d3,d4,trim\n400,40,40,40,40,0\n100,30,30,30,30,150\n";
        let err = read_log_sheet_csv_from_bytes(data.as_bytes()).unwrap_err();
        assert!(matches!(err, KayuError::ValidationError(_)));
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn test_lenient_collects_all_issues() {
        let data = "length,d1,d2,d3,d4\n0,40,40,40,40\n400,40,40,40,40\n400,0,40,40,40\n";
        let (rows, issues) = parse_log_sheet_csv_lenient(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].row_index, 0);
        assert_eq!(issues[1].row_index, 2);
        assert_eq!(issues[1].field, "d1");
    }

    #[test]
    fn test_format_error_is_fatal() {
        let data = "length,d1,d2,d3,d4\nabc,40,40,40,40\n";
        assert!(matches!(
            parse_log_sheet_csv_lenient(data.as_bytes()),
            Err(KayuError::Csv(_))
        ));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        std::fs::write(&path, SHEET).unwrap();
        assert_eq!(read_log_sheet_csv(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_inventory_export() {
        let items = BatchIntake {
            invoice_number: "BELI-01".to_string(),
            contact_id: None,
            wood_type: "Mahoni".to_string(),
            total_invoice_price: 1_000_000.0,
            logs: vec![WoodLogMeasurement::new(400.0, 40.0, 40.0, 40.0, 40.0)],
        }
        .to_items();
        let text = String::from_utf8(inventory_csv_bytes(&items).unwrap()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,invoice_number,supplier,wood_type"));
        let row = lines.next().unwrap();
        assert!(row.contains("Mahoni"));
        assert!(row.contains("available"));
        assert!(lines.next().is_none());
    }
}
