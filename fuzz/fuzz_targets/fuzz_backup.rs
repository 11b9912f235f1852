#![no_main]

use kayulog::analysis::{compute_dashboard, profit_loss, Period};
use kayulog::io::read_backup_from_bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = read_backup_from_bytes(data) {
        let _ = compute_dashboard(&snapshot);
        let _ = profit_loss(&snapshot, Period::Monthly);
    }
});
