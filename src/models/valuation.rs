use serde::{Deserialize, Serialize};

use crate::error::KayuError;

/// Cross-section factor for a circle from its diameter (pi / 4, as used on the
/// yard's tally sheets).
pub const CROSS_SECTION_FACTOR: f64 = 0.7854;

/// Divisor applied to `diameter^2 * length` (both in cm) to get the tallied volume.
pub const VOLUME_DIVISOR: f64 = 10_000.0;

/// Arithmetic mean of the four caliper readings.
///
/// Zero or negative readings are not rejected; they simply pull the mean down.
pub fn average_diameter(d1: f64, d2: f64, d3: f64, d4: f64) -> f64 {
    (d1 + d2 + d3 + d4) / 4.0
}

/// Length left after trimming defects. Goes negative when `trim > length`.
pub fn effective_length(length: f64, trim: f64) -> f64 {
    length - trim
}

/// Cylinder volume of the trimmed log.
///
/// `V = 0.7854 * avg_diameter^2 * effective_length / 10000`
pub fn gross_volume(avg_diameter: f64, effective_length: f64) -> f64 {
    (CROSS_SECTION_FACTOR * avg_diameter.powi(2) * effective_length) / VOLUME_DIVISOR
}

/// Volume of the internal defect, measured against the untrimmed length.
///
/// `V = 0.7854 * gr^2 * original_length / 10000`, or exactly 0 when `gr == 0`.
pub fn gr_volume(gr: f64, original_length: f64) -> f64 {
    if gr == 0.0 {
        return 0.0;
    }
    (CROSS_SECTION_FACTOR * gr.powi(2) * original_length) / VOLUME_DIVISOR
}

/// Sellable volume. Not clamped: a large defect yields a negative result.
pub fn net_volume(gross_volume: f64, gr_volume: f64) -> f64 {
    gross_volume - gr_volume
}

/// Result of spreading one invoice total across a batch of logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPricing {
    /// Price per cubic unit of net volume.
    pub unit_price: f64,
    /// Monetary value of each log, in input order.
    pub per_log_value: Vec<f64>,
}

/// Allocate an invoice total across logs proportionally to net volume.
///
/// When the batch has no positive total volume the unit price is 0 and every
/// log is valued at 0.
///
/// # Examples
///
/// ```
/// use kayulog::models::allocate_batch_pricing;
///
/// let pricing = allocate_batch_pricing(&[0.5, 0.5], 1_000_000.0);
/// assert_eq!(pricing.unit_price, 1_000_000.0);
/// assert_eq!(pricing.per_log_value, vec![500_000.0, 500_000.0]);
/// ```
pub fn allocate_batch_pricing(net_volumes: &[f64], total_invoice_price: f64) -> BatchPricing {
    let total_volume: f64 = net_volumes.iter().sum();
    let unit_price = if total_volume > 0.0 {
        total_invoice_price / total_volume
    } else {
        0.0
    };
    BatchPricing {
        unit_price,
        per_log_value: net_volumes.iter().map(|v| v * unit_price).collect(),
    }
}

/// Raw measurements of one log, all in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WoodLogMeasurement {
    pub length: f64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    /// Length removed from the ends for defects.
    #[serde(default)]
    pub trim: f64,
    /// Defect diameter; 0 means no defect.
    #[serde(default)]
    pub gr: f64,
}

/// Figures derived from a [`WoodLogMeasurement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WoodLogValuation {
    pub avg_diameter: f64,
    pub effective_length: f64,
    pub gross_volume: f64,
    pub gr_volume: f64,
    pub net_volume: f64,
}

/// A measured log after batch pricing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedLog {
    pub measurement: WoodLogMeasurement,
    pub valuation: WoodLogValuation,
    pub unit_price: f64,
    pub total_value: f64,
}

/// A problem found while checking user-entered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row_index: usize,
    pub field: String,
    pub message: String,
}

impl WoodLogMeasurement {
    pub fn new(length: f64, d1: f64, d2: f64, d3: f64, d4: f64) -> Self {
        Self {
            length,
            d1,
            d2,
            d3,
            d4,
            trim: 0.0,
            gr: 0.0,
        }
    }

    pub fn with_trim(mut self, trim: f64) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_gr(mut self, gr: f64) -> Self {
        self.gr = gr;
        self
    }

    /// Run the volume formulas. Never fails; bad input gives degenerate numbers.
    pub fn valuate(&self) -> WoodLogValuation {
        let avg = average_diameter(self.d1, self.d2, self.d3, self.d4);
        let eff = effective_length(self.length, self.trim);
        let gross = gross_volume(avg, eff);
        let gr = gr_volume(self.gr, self.length);
        WoodLogValuation {
            avg_diameter: avg,
            effective_length: eff,
            gross_volume: gross,
            gr_volume: gr,
            net_volume: net_volume(gross, gr),
        }
    }

    /// Collect every sanitization problem with this measurement.
    pub fn validate_all(&self, row_index: usize) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut push = |field: &str, message: String| {
            issues.push(ValidationIssue {
                row_index,
                field: field.to_string(),
                message,
            });
        };

        let fields = [
            ("length", self.length),
            ("d1", self.d1),
            ("d2", self.d2),
            ("d3", self.d3),
            ("d4", self.d4),
            ("trim", self.trim),
            ("gr", self.gr),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                push(name, format!("{name} must be a finite number, got {value}"));
            }
        }

        if self.length.is_finite() && self.length <= 0.0 {
            push("length", format!("length must be positive, got {}", self.length));
        }
        for (name, value) in &fields[1..5] {
            if value.is_finite() && *value <= 0.0 {
                push(name, format!("{name} must be positive, got {value}"));
            }
        }
        if self.trim.is_finite() && self.trim < 0.0 {
            push("trim", format!("trim must not be negative, got {}", self.trim));
        }
        if self.trim.is_finite() && self.length.is_finite() && self.trim > self.length {
            push(
                "trim",
                format!("trim {} exceeds log length {}", self.trim, self.length),
            );
        }
        if self.gr.is_finite() && self.gr < 0.0 {
            push("gr", format!("gr must not be negative, got {}", self.gr));
        }

        issues
    }

    /// Validate the measurement. Returns the first issue as a `ValidationError`.
    pub fn validate(&self) -> Result<(), KayuError> {
        match self.validate_all(0).into_iter().next() {
            Some(issue) => Err(KayuError::ValidationError(issue.message)),
            None => Ok(()),
        }
    }
}

/// Valuate every log and spread `total_invoice_price` across them.
pub fn price_batch(
    measurements: &[WoodLogMeasurement],
    total_invoice_price: f64,
) -> Vec<PricedLog> {
    let valuations: Vec<WoodLogValuation> = measurements.iter().map(|m| m.valuate()).collect();
    let volumes: Vec<f64> = valuations.iter().map(|v| v.net_volume).collect();
    let pricing = allocate_batch_pricing(&volumes, total_invoice_price);

    measurements
        .iter()
        .zip(valuations)
        .zip(pricing.per_log_value)
        .map(|((measurement, valuation), total_value)| PricedLog {
            measurement: *measurement,
            valuation,
            unit_price: pricing.unit_price,
            total_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample_log() -> WoodLogMeasurement {
        WoodLogMeasurement::new(400.0, 42.0, 44.0, 43.0, 45.0)
            .with_trim(10.0)
            .with_gr(5.0)
    }

    // --- Formula tests ---

    #[test]
    fn test_average_of_equal_diameters_is_exact() {
        for d in [0.1, 17.0, 43.5, 99.99, 1234.5678] {
            assert_eq!(average_diameter(d, d, d, d), d);
        }
    }

    #[test]
    fn test_average_diameter_mean() {
        assert_eq!(average_diameter(42.0, 44.0, 43.0, 45.0), 43.5);
    }

    #[test]
    fn test_average_diameter_with_missing_reading_degrades() {
        assert_eq!(average_diameter(40.0, 40.0, 40.0, 0.0), 30.0);
    }

    #[test]
    fn test_effective_length() {
        assert_eq!(effective_length(400.0, 10.0), 390.0);
        assert_eq!(effective_length(400.0, 0.0), 400.0);
    }

    #[test]
    fn test_effective_length_negative_when_trim_exceeds_length() {
        assert_eq!(effective_length(100.0, 150.0), -50.0);
    }

    #[test]
    fn test_gross_volume_reference_value() {
        // 0.7854 * 43.5^2 * 390 / 10000
        let v = gross_volume(43.5, 390.0);
        assert_approx_eq!(v, 57.960_752_85, 1e-6);
        assert_eq!(v, 0.7854 * 43.5_f64.powi(2) * 390.0 / 10000.0);
    }

    #[test]
    fn test_gr_volume_zero_defect() {
        assert_eq!(gr_volume(0.0, 380.0), 0.0);
        assert_eq!(gr_volume(0.0, 0.0), 0.0);
        assert_eq!(gr_volume(0.0, -5.0), 0.0);
    }

    #[test]
    fn test_gr_volume_reference_value() {
        assert_approx_eq!(gr_volume(5.0, 380.0), 0.74613, 1e-9);
    }

    #[test]
    fn test_net_volume_is_plain_difference() {
        assert_eq!(net_volume(1.0, 0.25), 0.75);
        assert_eq!(net_volume(0.1, 0.5), 0.1 - 0.5);
    }

    // --- Measurement tests ---

    #[test]
    fn test_valuate_uses_original_length_for_defect() {
        let log = sample_log();
        let val = log.valuate();
        assert_eq!(val.avg_diameter, 43.5);
        assert_eq!(val.effective_length, 390.0);
        assert_eq!(val.gross_volume, gross_volume(43.5, 390.0));
        assert_eq!(val.gr_volume, gr_volume(5.0, 400.0));
        assert_ne!(val.gr_volume, gr_volume(5.0, 390.0));
        assert_eq!(val.net_volume, val.gross_volume - val.gr_volume);
    }

    #[test]
    fn test_valuate_is_bit_identical_on_repeat() {
        let log = sample_log();
        let a = log.valuate();
        let b = log.valuate();
        assert_eq!(a.net_volume.to_bits(), b.net_volume.to_bits());
        assert_eq!(a.gross_volume.to_bits(), b.gross_volume.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_valuate_large_defect_goes_negative() {
        let log = WoodLogMeasurement::new(100.0, 10.0, 10.0, 10.0, 10.0).with_gr(30.0);
        assert!(log.valuate().net_volume < 0.0);
    }

    #[test]
    fn test_valuate_nan_propagates() {
        let log = WoodLogMeasurement::new(f64::NAN, 10.0, 10.0, 10.0, 10.0);
        assert!(log.valuate().net_volume.is_nan());
    }

    #[test]
    fn test_measurement_json_defaults_trim_and_gr() {
        let log: WoodLogMeasurement =
            serde_json::from_str(r#"{"length":300,"d1":30,"d2":31,"d3":32,"d4":33}"#).unwrap();
        assert_eq!(log.trim, 0.0);
        assert_eq!(log.gr, 0.0);
    }

    // --- Validation tests ---

    #[test]
    fn test_validate_accepts_normal_log() {
        assert!(sample_log().validate().is_ok());
        assert!(sample_log().validate_all(0).is_empty());
    }

    #[test]
    fn test_validate_rejects_trim_longer_than_log() {
        let log = WoodLogMeasurement::new(100.0, 30.0, 30.0, 30.0, 30.0).with_trim(120.0);
        let issues = log.validate_all(3);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "trim");
        assert_eq!(issues[0].row_index, 3);
        assert!(log.validate().is_err());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let log = WoodLogMeasurement {
            length: -1.0,
            d1: 0.0,
            d2: 30.0,
            d3: f64::NAN,
            d4: 30.0,
            trim: -2.0,
            gr: -1.0,
        };
        let fields: Vec<String> = log.validate_all(0).into_iter().map(|i| i.field).collect();
        assert!(fields.contains(&"length".to_string()));
        assert!(fields.contains(&"d1".to_string()));
        assert!(fields.contains(&"d3".to_string()));
        assert!(fields.contains(&"trim".to_string()));
        assert!(fields.contains(&"gr".to_string()));
    }

    // --- Batch pricing tests ---

    #[test]
    fn test_allocate_equal_halves() {
        let pricing = allocate_batch_pricing(&[0.5, 0.5], 1_000_000.0);
        assert_eq!(pricing.unit_price, 1_000_000.0);
        assert_eq!(pricing.per_log_value, vec![500_000.0, 500_000.0]);
    }

    #[test]
    fn test_allocate_zero_volume_gives_zero_price() {
        let pricing = allocate_batch_pricing(&[0.0, 0.0], 1_000_000.0);
        assert_eq!(pricing.unit_price, 0.0);
        assert_eq!(pricing.per_log_value, vec![0.0, 0.0]);
    }

    #[test]
    fn test_allocate_empty_batch() {
        let pricing = allocate_batch_pricing(&[], 500.0);
        assert_eq!(pricing.unit_price, 0.0);
        assert!(pricing.per_log_value.is_empty());
    }

    #[test]
    fn test_allocate_values_sum_to_invoice() {
        let pricing = allocate_batch_pricing(&[0.3, 0.45, 0.8], 2_500_000.0);
        let sum: f64 = pricing.per_log_value.iter().sum();
        assert_approx_eq!(sum, 2_500_000.0, 1e-6);
    }

    #[test]
    fn test_price_batch_stamps_shared_unit_price() {
        let logs = vec![
            sample_log(),
            WoodLogMeasurement::new(380.0, 40.0, 41.0, 42.0, 43.0),
        ];
        let priced = price_batch(&logs, 10_000_000.0);
        assert_eq!(priced.len(), 2);
        assert_eq!(priced[0].unit_price, priced[1].unit_price);
        for p in &priced {
            assert_eq!(p.total_value, p.valuation.net_volume * p.unit_price);
        }
        let sum: f64 = priced.iter().map(|p| p.total_value).sum();
        assert_approx_eq!(sum, 10_000_000.0, 1e-6);
    }
}
