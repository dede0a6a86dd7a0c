//! # Unit Types
//!
//! Type-safe wrappers for the units a dip calculation moves between. They
//! are plain `f64` newtypes so JSON stays clean (just numbers).
//!
//! ## Units in Use
//!
//! - Tank geometry is entered in meters (m)
//! - Dips are read in centimeters (cm)
//! - The segment geometry is computed in millimeters (mm, mm²)
//! - Volumes are reported in liters (L), 1 L = 1,000,000 mm³
//!
//! ## Example
//!
//! ```rust
//! use dip_core::units::{Centimeters, Meters, Millimeters};
//!
//! let dip = Centimeters(152.5);
//! let dip_mm: Millimeters = dip.into();
//! assert_eq!(dip_mm.0, 1525.0);
//!
//! let diameter: Millimeters = Meters(2.4).into();
//! assert!((diameter.0 - 2400.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Cubic millimeters in one liter.
pub const MM3_PER_LITER: f64 = 1_000_000.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

// ============================================================================
// Area and Volume Units
// ============================================================================

/// Area in square millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

/// Volume in liters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Liters(pub f64);

impl SqMm {
    /// Sweep this cross-section along a length to get a volume in liters.
    pub fn extrude(self, length: Millimeters) -> Liters {
        Liters(self.0 * length.0 / MM3_PER_LITER)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(SqMm);
impl_arithmetic!(Liters);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centimeters_to_millimeters() {
        let mm: Millimeters = Centimeters(12.5).into();
        assert_eq!(mm.0, 125.0);
        let back: Centimeters = mm.into();
        assert_eq!(back.0, 12.5);
    }

    #[test]
    fn test_meters_conversions() {
        let mm: Millimeters = Meters(5.0).into();
        assert_eq!(mm.0, 5000.0);
        let cm: Centimeters = Meters(2.0).into();
        assert_eq!(cm.0, 200.0);
        let m: Meters = Millimeters(2500.0).into();
        assert_eq!(m.0, 2.5);
    }

    #[test]
    fn test_extrude_to_liters() {
        // 1 m² cross-section swept over 1 m is 1000 L
        let area = SqMm(1_000_000.0);
        assert_eq!(area.extrude(Millimeters(1000.0)), Liters(1000.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Liters(10.0);
        let b = Liters(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let dip = Centimeters(87.5);
        let json = serde_json::to_string(&dip).unwrap();
        assert_eq!(json, "87.5");
        let roundtrip: Centimeters = serde_json::from_str(&json).unwrap();
        assert_eq!(dip, roundtrip);
    }
}
