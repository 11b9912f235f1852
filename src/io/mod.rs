mod csv_io;
mod excel_io;
mod json_io;

use std::path::Path;

use serde::Deserialize;

use crate::error::KayuError;
use crate::models::{ValidationIssue, WoodLogMeasurement};

pub use csv_io::{
    inventory_csv_bytes, read_log_sheet_csv, read_log_sheet_csv_from_bytes, sales_csv_bytes,
    write_inventory_csv, write_sales_csv,
};
pub use excel_io::{
    read_log_sheet_excel, read_log_sheet_excel_from_bytes, report_excel_bytes, write_report_excel,
};
pub use json_io::{backup_to_string, read_backup, read_backup_from_bytes, write_backup};

pub(crate) use csv_io::parse_log_sheet_csv_lenient;
pub(crate) use excel_io::parse_log_sheet_excel_lenient;

/// One raw log-sheet row. `trim` and `gr` may be absent or blank.
#[derive(Debug, Deserialize)]
pub(crate) struct LogRow {
    pub length: f64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    #[serde(default)]
    pub trim: Option<f64>,
    #[serde(default)]
    pub gr: Option<f64>,
}

impl LogRow {
    fn into_measurement(self) -> WoodLogMeasurement {
        WoodLogMeasurement::new(self.length, self.d1, self.d2, self.d3, self.d4)
            .with_trim(self.trim.unwrap_or(0.0))
            .with_gr(self.gr.unwrap_or(0.0))
    }
}

/// Convert rows, failing on the first invalid measurement.
pub(crate) fn check_rows(rows: Vec<LogRow>) -> Result<Vec<WoodLogMeasurement>, KayuError> {
    let logs: Vec<WoodLogMeasurement> = rows.into_iter().map(LogRow::into_measurement).collect();
    for (i, log) in logs.iter().enumerate() {
        if let Some(issue) = log.validate_all(i).into_iter().next() {
            return Err(KayuError::ValidationError(format!(
                "Row {}: {}",
                i + 1,
                issue.message
            )));
        }
    }
    Ok(logs)
}

/// Convert rows, keeping invalid ones and reporting every issue.
pub(crate) fn collect_rows(rows: Vec<LogRow>) -> (Vec<WoodLogMeasurement>, Vec<ValidationIssue>) {
    let logs: Vec<WoodLogMeasurement> = rows.into_iter().map(LogRow::into_measurement).collect();
    let issues = logs
        .iter()
        .enumerate()
        .flat_map(|(i, log)| log.validate_all(i))
        .collect();
    (logs, issues)
}

/// Source format of a log sheet.
pub trait LogSheetReader {
    /// Read and validate every row of the sheet at `path`.
    fn read(&self, path: &Path) -> Result<Vec<WoodLogMeasurement>, KayuError>;

    /// Parse in-memory sheet data without rejecting invalid rows.
    fn parse_lenient(
        &self,
        data: &[u8],
    ) -> Result<(Vec<WoodLogMeasurement>, Vec<ValidationIssue>), KayuError>;
}

/// Comma-separated log sheets.
pub struct CsvFormat;

impl LogSheetReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Vec<WoodLogMeasurement>, KayuError> {
        read_log_sheet_csv(path)
    }

    fn parse_lenient(
        &self,
        data: &[u8],
    ) -> Result<(Vec<WoodLogMeasurement>, Vec<ValidationIssue>), KayuError> {
        parse_log_sheet_csv_lenient(data)
    }
}

/// Excel (.xlsx) log sheets.
pub struct ExcelFormat;

impl LogSheetReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<Vec<WoodLogMeasurement>, KayuError> {
        read_log_sheet_excel(path)
    }

    fn parse_lenient(
        &self,
        data: &[u8],
    ) -> Result<(Vec<WoodLogMeasurement>, Vec<ValidationIssue>), KayuError> {
        parse_log_sheet_excel_lenient(data)
    }
}

/// Pick a reader from a file name's extension.
pub fn reader_for(file_name: &str) -> Result<Box<dyn LogSheetReader>, KayuError> {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        other => Err(KayuError::ParseError(format!(
            "Unsupported log sheet format: '{other}'. Use .csv or .xlsx"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_for_extension() {
        assert!(reader_for("logs.CSV").is_ok());
        assert!(reader_for("logs.xlsx").is_ok());
        assert!(matches!(reader_for("logs.txt"), Err(KayuError::ParseError(_))));
        assert!(matches!(reader_for("legacy.xls"), Err(KayuError::ParseError(_))));
        assert!(reader_for("logs").is_err());
    }

    #[test]
    fn test_trait_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        std::fs::write(&path, "length,d1,d2,d3,d4,gr\n380,40,41,42,43,5\n").unwrap();

        let reader = reader_for("logs.csv").unwrap();
        let logs = reader.read(&path).unwrap();
        assert_eq!(logs, vec![WoodLogMeasurement::new(380.0, 40.0, 41.0, 42.0, 43.0).with_gr(5.0)]);

        let (rows, issues) = CsvFormat.parse_lenient(b"length,d1,d2,d3,d4\n10,1,1,1,1\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(issues.is_empty());
    }
}
