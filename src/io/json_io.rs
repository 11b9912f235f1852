use std::path::Path;

use crate::error::KayuError;
use crate::models::Snapshot;

/// Serialize a backup snapshot to JSON text.
pub fn backup_to_string(snapshot: &Snapshot, pretty: bool) -> Result<String, KayuError> {
    Ok(if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    })
}

/// Write a backup snapshot to a JSON file.
pub fn write_backup(
    snapshot: &Snapshot,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), KayuError> {
    std::fs::write(path.as_ref(), backup_to_string(snapshot, pretty)?)?;
    Ok(())
}

/// Read a backup snapshot from a JSON file.
pub fn read_backup(path: impl AsRef<Path>) -> Result<Snapshot, KayuError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a backup snapshot from JSON bytes.
pub fn read_backup_from_bytes(data: &[u8]) -> Result<Snapshot, KayuError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| KayuError::ParseError(format!("Invalid UTF-8: {e}")))?;
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchIntake, WoodLogMeasurement};

    #[test]
    fn test_backup_file_roundtrip() {
        let mut snap = Snapshot::empty();
        snap.inventory = BatchIntake {
            invoice_number: "BELI-01".to_string(),
            contact_id: None,
            wood_type: "Akasia".to_string(),
            total_invoice_price: 750_000.0,
            logs: vec![WoodLogMeasurement::new(250.0, 25.0, 26.0, 27.0, 28.0).with_trim(5.0)],
        }
        .to_items();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        write_backup(&snap, &path, true).unwrap();
        let loaded = read_backup(&path).unwrap();
        assert_eq!(loaded.inventory.len(), 1);
        assert_eq!(loaded.inventory[0].id, snap.inventory[0].id);
        assert_eq!(loaded.inventory[0].measurement.trim, 5.0);
        let drift =
            loaded.inventory[0].valuation.net_volume - snap.inventory[0].valuation.net_volume;
        assert!(drift.abs() < 1e-12);
        assert_eq!(loaded.exported_at, snap.exported_at);
    }

    #[test]
    fn test_partial_backup_defaults_missing_sections() {
        let json = br#"{"exported_at": "2024-05-01T00:00:00Z", "expenses": []}"#;
        let snap = read_backup_from_bytes(json).unwrap();
        assert_eq!(snap.num_records(), 0);
    }

    #[test]
    fn test_invalid_utf8() {
        let err = read_backup_from_bytes(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, KayuError::ParseError(_)));
    }
}
