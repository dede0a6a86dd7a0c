//! # Tanks
//!
//! Master data for a storage tank and the [`Tank`] trait that turns a dip
//! into a [`Level`].
//!
//! ## Example
//!
//! ```rust
//! use dip_core::tank::{HorizontalCylinderTank, Tank};
//! use dip_core::units::Centimeters;
//!
//! let tank = HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0);
//! let level = tank.level(Centimeters(100.0));
//! assert!((level.percentage() - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::dip_chart::{self, DipChart, DipChartSettings};
use crate::calculations::dip_volume::{self, validate_geometry, DipVolumeInput, DipVolumeResult};
use crate::errors::{DipError, DipResult};
use crate::units::{Centimeters, Liters, Meters};

/// Fill state of a tank at a given dip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub(crate) volume: Liters,
    pub(crate) percentage: f64,
}

impl Level {
    pub fn volume(&self) -> Liters {
        self.volume
    }

    /// Fraction of capacity, `0.0 ..= 1.0`
    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

impl From<Level> for f64 {
    fn from(level: Level) -> Self {
        level.percentage
    }
}

impl From<Level> for Liters {
    fn from(level: Level) -> Self {
        level.volume
    }
}

pub trait Tank {
    /// Volume of the full tank.
    fn capacity(&self) -> Liters;

    /// Level for a dip reading. Degenerate tanks and readings give an empty level.
    fn level(&self, dip: Centimeters) -> Level;
}

/// A horizontal cylindrical storage tank as recorded in station master data.
///
/// ## JSON Example
///
/// ```json
/// {
///   "tank_name": "T-1",
///   "product_name": "Diesel",
///   "inside_length_m": 5.0,
///   "inside_diameter_m": 2.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCylinderTank {
    /// Tank label (e.g., "T-1", "HSD Tank 2")
    pub tank_name: String,

    /// Product stored (e.g., "Petrol", "Diesel")
    pub product_name: String,

    /// Inside length in meters
    pub inside_length_m: f64,

    /// Inside diameter in meters
    pub inside_diameter_m: f64,
}

impl HorizontalCylinderTank {
    pub fn new(
        tank_name: impl Into<String>,
        product_name: impl Into<String>,
        inside_length_m: f64,
        inside_diameter_m: f64,
    ) -> Self {
        HorizontalCylinderTank {
            tank_name: tank_name.into(),
            product_name: product_name.into(),
            inside_length_m,
            inside_diameter_m,
        }
    }

    /// Validate the master-data record.
    pub fn validate(&self) -> DipResult<()> {
        if self.tank_name.trim().is_empty() {
            return Err(DipError::missing_field("tank_name"));
        }
        if self.product_name.trim().is_empty() {
            return Err(DipError::missing_field("product_name"));
        }
        validate_geometry(self.inside_length_m, self.inside_diameter_m)
    }

    /// Checked dip conversion for this tank.
    pub fn dip_volume(&self, dip_cm: f64) -> DipResult<DipVolumeResult> {
        dip_volume::calculate(&DipVolumeInput::new(
            self.inside_length_m,
            self.inside_diameter_m,
            dip_cm,
        ))
    }

    /// Dip chart for this tank.
    pub fn dip_chart(&self, settings: &DipChartSettings) -> DipResult<DipChart> {
        dip_chart::generate(self.inside_length_m, self.inside_diameter_m, settings)
    }

    /// Dip at which the tank reads full, in centimeters.
    pub fn full_dip(&self) -> Centimeters {
        Centimeters::from(Meters(self.inside_diameter_m))
    }
}

impl Tank for HorizontalCylinderTank {
    fn capacity(&self) -> Liters {
        if validate_geometry(self.inside_length_m, self.inside_diameter_m).is_err() {
            return Liters(0.0);
        }
        Liters(dip_volume::full_cylinder_volume(self.inside_length_m, self.inside_diameter_m))
    }

    fn level(&self, dip: Centimeters) -> Level {
        match self.dip_volume(dip.0) {
            Ok(result) => Level {
                volume: Liters(result.volume_l),
                percentage: result.fill_fraction,
            },
            Err(_) => Level {
                volume: Liters(0.0),
                percentage: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tank() -> HorizontalCylinderTank {
        HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0)
    }

    #[test]
    fn test_capacity() {
        assert_relative_eq!(tank().capacity().0, 15707.963, epsilon = 1e-3);
    }

    #[test]
    fn test_level() {
        let level = tank().level(Centimeters(200.0));
        assert_relative_eq!(level.percentage(), 1.0);
        assert_relative_eq!(Liters::from(level).0, tank().capacity().0);

        let empty = tank().level(Centimeters(0.0));
        assert_eq!(f64::from(empty), 0.0);
    }

    #[test]
    fn test_degenerate_tank_is_empty() {
        let broken = HorizontalCylinderTank::new("T-9", "Petrol", 0.0, 2.0);
        assert_eq!(broken.capacity(), Liters(0.0));
        assert_eq!(broken.level(Centimeters(50.0)).volume(), Liters(0.0));
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_validate_names() {
        let mut t = tank();
        t.tank_name = "  ".to_string();
        assert_eq!(t.validate(), Err(DipError::missing_field("tank_name")));

        let mut t = tank();
        t.product_name.clear();
        assert_eq!(t.validate(), Err(DipError::missing_field("product_name")));

        assert!(tank().validate().is_ok());
    }

    #[test]
    fn test_full_dip() {
        assert_eq!(tank().full_dip(), Centimeters(200.0));

        let odd = HorizontalCylinderTank::new("T-9", "Kerosene", 3.0, 1.37);
        let chart = odd.dip_chart(&DipChartSettings::default()).unwrap();
        assert_eq!(odd.full_dip().value(), chart.full_dip_cm);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string_pretty(&tank()).unwrap();
        assert!(json.contains("\"inside_diameter_m\": 2.0"));
        let roundtrip: HorizontalCylinderTank = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, tank());
    }
}
