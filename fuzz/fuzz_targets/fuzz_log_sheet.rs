#![no_main]

use kayulog::io::{read_log_sheet_csv_from_bytes, CsvFormat, ExcelFormat, LogSheetReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(logs) = read_log_sheet_csv_from_bytes(data) {
        for log in logs {
            let _ = log.valuate();
        }
    }

    let readers: [&dyn LogSheetReader; 2] = [&CsvFormat, &ExcelFormat];
    for reader in readers {
        if let Ok((logs, issues)) = reader.parse_lenient(data) {
            assert!(issues.iter().all(|issue| issue.row_index < logs.len()));
            for log in logs {
                let _ = log.valuate();
            }
        }
    }
});
