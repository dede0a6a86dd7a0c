//! # Stock Readings and Reconciliation
//!
//! Turns recorded dips into stock figures and compares the physical stock
//! at closing against the book stock implied by receipts and metered sales.
//!
//! ## Reconciliation
//!
//! ```text
//! book closing = opening volume + receipts - sales
//! variance     = closing volume - book closing     (negative = loss)
//! variance %   = variance / sales * 100            (0 when sales are 0)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dip_core::calculations::stock::{reconcile, StockReconciliationInput};
//! use dip_core::tank::HorizontalCylinderTank;
//!
//! let tank = HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0);
//! let input = StockReconciliationInput {
//!     opening_dip_cm: 150.0,
//!     closing_dip_cm: 100.0,
//!     receipts_l: 0.0,
//!     sales_l: 4000.0,
//! };
//! let result = reconcile(&tank, &input).unwrap();
//! assert!(result.variance_l < 0.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DipError, DipResult};
use crate::tank::HorizontalCylinderTank;

/// A dip as entered by an attendant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipEntry {
    /// Tank the dip was taken in
    pub tank_id: Uuid,

    /// Dip reading in centimeters
    pub dip_cm: f64,

    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,
}

impl DipEntry {
    /// Entry timestamped now.
    pub fn now(tank_id: Uuid, dip_cm: f64) -> Self {
        DipEntry {
            tank_id,
            dip_cm,
            recorded_at: Utc::now(),
        }
    }
}

/// Stock held in a tank at the time of a dip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReading {
    pub tank_id: Uuid,
    pub dip_cm: f64,

    /// Liquid volume (L)
    pub volume_l: f64,

    /// Remaining space before full (L)
    pub ullage_l: f64,

    pub recorded_at: DateTime<Utc>,
}

/// Convert a dip entry into a stock reading for the given tank.
pub fn stock_reading(tank: &HorizontalCylinderTank, entry: &DipEntry) -> DipResult<StockReading> {
    let result = tank.dip_volume(entry.dip_cm)?;
    Ok(StockReading {
        tank_id: entry.tank_id,
        dip_cm: entry.dip_cm,
        volume_l: result.volume_l,
        ullage_l: result.ullage_l(),
        recorded_at: entry.recorded_at,
    })
}

/// Opening/closing dips and the movements between them.
///
/// ## JSON Example
///
/// ```json
/// {
///   "opening_dip_cm": 152.0,
///   "closing_dip_cm": 131.5,
///   "receipts_l": 0.0,
///   "sales_l": 2100.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockReconciliationInput {
    /// Dip at the start of the period (cm)
    pub opening_dip_cm: f64,

    /// Dip at the end of the period (cm)
    pub closing_dip_cm: f64,

    /// Product delivered into the tank during the period (L)
    pub receipts_l: f64,

    /// Product dispensed according to the nozzle meters (L)
    pub sales_l: f64,
}

impl StockReconciliationInput {
    /// Validate the movement figures. Dips are validated by the volume calculation.
    pub fn validate(&self) -> DipResult<()> {
        for (field, value) in [("receipts_l", self.receipts_l), ("sales_l", self.sales_l)] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(DipError::invalid_input(
                    field,
                    value.to_string(),
                    "Movement must be a non-negative number of liters",
                ));
            }
        }
        Ok(())
    }
}

/// Result of comparing physical stock to book stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockReconciliation {
    pub opening_volume_l: f64,
    pub closing_volume_l: f64,
    pub receipts_l: f64,
    pub sales_l: f64,

    /// Opening volume + receipts - sales
    pub book_closing_l: f64,

    /// Closing volume - book closing; negative is a loss
    pub variance_l: f64,

    /// Variance as a percentage of sales; 0 when there were no sales
    pub variance_percent: f64,
}

impl StockReconciliation {
    /// True when the tank holds less than the books say it should.
    pub fn is_loss(&self) -> bool {
        self.variance_l < 0.0
    }

    /// True when the absolute variance is within `tolerance_percent` of sales.
    pub fn within_tolerance(&self, tolerance_percent: f64) -> bool {
        self.variance_percent.abs() <= tolerance_percent
    }
}

/// Reconcile a tank's stock over a period.
///
/// # Returns
///
/// * `Ok(StockReconciliation)` - Book and physical figures with the variance
/// * `Err(DipError::InvalidInput)` - Bad tank geometry, dip or movement
pub fn reconcile(tank: &HorizontalCylinderTank, input: &StockReconciliationInput) -> DipResult<StockReconciliation> {
    input.validate()?;

    let opening_volume_l = tank
        .dip_volume(input.opening_dip_cm)
        .map_err(|e| rename_dip_field(e, "opening_dip_cm"))?
        .volume_l;
    let closing_volume_l = tank
        .dip_volume(input.closing_dip_cm)
        .map_err(|e| rename_dip_field(e, "closing_dip_cm"))?
        .volume_l;

    let book_closing_l = opening_volume_l + input.receipts_l - input.sales_l;
    let variance_l = closing_volume_l - book_closing_l;
    let variance_percent = if input.sales_l > 0.0 {
        variance_l / input.sales_l * 100.0
    } else {
        0.0
    };

    Ok(StockReconciliation {
        opening_volume_l,
        closing_volume_l,
        receipts_l: input.receipts_l,
        sales_l: input.sales_l,
        book_closing_l,
        variance_l,
        variance_percent,
    })
}

/// Point a dip error at the reading that caused it.
fn rename_dip_field(error: DipError, field: &str) -> DipError {
    match error {
        DipError::InvalidInput { field: f, value, reason } if f == "dip_cm" => DipError::InvalidInput {
            field: field.to_string(),
            value,
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::dip_volume::compute_volume;
    use approx::assert_relative_eq;

    fn tank() -> HorizontalCylinderTank {
        HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0)
    }

    #[test]
    fn test_stock_reading() {
        let entry = DipEntry::now(Uuid::new_v4(), 100.0);
        let reading = stock_reading(&tank(), &entry).unwrap();
        assert_relative_eq!(reading.volume_l, 7853.98, epsilon = 0.01);
        assert_relative_eq!(reading.ullage_l, 7853.98, epsilon = 0.01);
        assert_eq!(reading.tank_id, entry.tank_id);
    }

    #[test]
    fn test_stock_reading_rejects_negative_dip() {
        let entry = DipEntry::now(Uuid::new_v4(), -2.0);
        assert!(stock_reading(&tank(), &entry).is_err());
    }

    #[test]
    fn test_exact_reconciliation() {
        let opening = compute_volume(5.0, 2.0, 150.0);
        let closing = compute_volume(5.0, 2.0, 100.0);
        let input = StockReconciliationInput {
            opening_dip_cm: 150.0,
            closing_dip_cm: 100.0,
            receipts_l: 1000.0,
            sales_l: opening + 1000.0 - closing,
        };
        let result = reconcile(&tank(), &input).unwrap();
        assert_relative_eq!(result.variance_l, 0.0, epsilon = 1e-6);
        assert!(result.within_tolerance(0.5));
    }

    #[test]
    fn test_loss() {
        let input = StockReconciliationInput {
            opening_dip_cm: 150.0,
            closing_dip_cm: 100.0,
            receipts_l: 0.0,
            sales_l: 4000.0,
        };
        let result = reconcile(&tank(), &input).unwrap();
        let expected_book = compute_volume(5.0, 2.0, 150.0) - 4000.0;
        assert_relative_eq!(result.book_closing_l, expected_book);
        assert!(result.is_loss());
        assert_relative_eq!(result.variance_percent, result.variance_l / 4000.0 * 100.0);
    }

    #[test]
    fn test_no_sales_has_zero_percent() {
        let input = StockReconciliationInput {
            opening_dip_cm: 50.0,
            closing_dip_cm: 60.0,
            receipts_l: 0.0,
            sales_l: 0.0,
        };
        let result = reconcile(&tank(), &input).unwrap();
        assert!(result.variance_l > 0.0);
        assert_eq!(result.variance_percent, 0.0);
    }

    #[test]
    fn test_invalid_movements_and_dips() {
        let mut input = StockReconciliationInput {
            opening_dip_cm: 50.0,
            closing_dip_cm: 60.0,
            receipts_l: -1.0,
            sales_l: 0.0,
        };
        let err = reconcile(&tank(), &input).unwrap_err();
        assert!(matches!(err, DipError::InvalidInput { ref field, .. } if field == "receipts_l"));

        input.receipts_l = 0.0;
        input.closing_dip_cm = f64::NAN;
        let err = reconcile(&tank(), &input).unwrap_err();
        assert!(matches!(err, DipError::InvalidInput { ref field, .. } if field == "closing_dip_cm"));
    }
}
