//! # Dip Volume Calculation
//!
//! Converts a dipstick reading in a horizontal cylindrical tank into the
//! volume of liquid held, by modelling the wetted cross-section as a
//! circular segment and sweeping it along the tank length.
//!
//! ## Entry Points
//!
//! - [`calculate`] - checked; degenerate input is a [`DipError`] naming the field
//! - [`compute_volume`] - total; degenerate input yields `0.0`
//!
//! Both share the same implementation: `compute_volume` is `calculate`
//! with every error mapped to zero liters.
//!
//! ## Example
//!
//! ```rust
//! use dip_core::calculations::dip_volume::{calculate, compute_volume, DipVolumeInput};
//!
//! // 2 m diameter, 5 m long, dipped at half height
//! let liters = compute_volume(5.0, 2.0, 100.0);
//! assert!((liters - 7853.98).abs() < 0.01);
//!
//! let result = calculate(&DipVolumeInput::new(5.0, 2.0, 100.0)).unwrap();
//! assert!((result.fill_fraction - 0.5).abs() < 1e-12);
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::equations::segment::{circle_area, segment_area};
use crate::errors::{DipError, DipResult};
use crate::units::{Centimeters, Meters, Millimeters, SqMm};

/// Input parameters for a single dip conversion.
///
/// ## JSON Example
///
/// ```json
/// {
///   "inside_length_m": 5.0,
///   "inside_diameter_m": 2.0,
///   "dip_cm": 87.5
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipVolumeInput {
    /// Tank inside length in meters
    pub inside_length_m: f64,

    /// Tank inside diameter in meters
    pub inside_diameter_m: f64,

    /// Liquid depth from the bottom of the tank in centimeters
    pub dip_cm: f64,
}

impl DipVolumeInput {
    pub fn new(inside_length_m: f64, inside_diameter_m: f64, dip_cm: f64) -> Self {
        DipVolumeInput {
            inside_length_m,
            inside_diameter_m,
            dip_cm,
        }
    }

    /// Validate input parameters.
    ///
    /// Geometry must be positive and finite. The dip must be non-negative;
    /// an infinite dip is accepted and reads as a full tank.
    pub fn validate(&self) -> DipResult<()> {
        validate_geometry(self.inside_length_m, self.inside_diameter_m)?;
        if !(self.dip_cm >= 0.0) {
            return Err(DipError::invalid_input(
                "dip_cm",
                self.dip_cm.to_string(),
                "Dip must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Dip converted to millimeters (unclamped)
    pub fn dip_mm(&self) -> f64 {
        Millimeters::from(Centimeters(self.dip_cm)).0
    }
}

/// Check tank geometry the way every calculation in this crate does.
pub(crate) fn validate_geometry(inside_length_m: f64, inside_diameter_m: f64) -> DipResult<()> {
    if !(inside_length_m > 0.0) || !inside_length_m.is_finite() {
        return Err(DipError::invalid_input(
            "inside_length_m",
            inside_length_m.to_string(),
            "Inside length must be a positive number",
        ));
    }
    if !(inside_diameter_m > 0.0) || !inside_diameter_m.is_finite() {
        return Err(DipError::invalid_input(
            "inside_diameter_m",
            inside_diameter_m.to_string(),
            "Inside diameter must be a positive number",
        ));
    }
    Ok(())
}

/// Results from a dip conversion.
///
/// ## JSON Example
///
/// ```json
/// {
///   "volume_l": 7853.98,
///   "capacity_l": 15707.96,
///   "fill_fraction": 0.5,
///   "dip_mm": 1000.0,
///   "liquid_height_mm": 1000.0,
///   "segment_area_mm2": 1570796.33,
///   "clamped": false
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipVolumeResult {
    /// Liquid volume in liters
    pub volume_l: f64,

    /// Volume of the full tank in liters
    pub capacity_l: f64,

    /// volume / capacity, 0.0 ..= 1.0
    pub fill_fraction: f64,

    /// Dip as read, in millimeters
    pub dip_mm: f64,

    /// Dip after clamping to the inside diameter, in millimeters
    pub liquid_height_mm: f64,

    /// Wetted cross-section in mm²
    pub segment_area_mm2: f64,

    /// True if the reading exceeded the diameter and was treated as full
    pub clamped: bool,
}

impl DipVolumeResult {
    /// Volume left to fill before the tank is full
    pub fn ullage_l(&self) -> f64 {
        (self.capacity_l - self.volume_l).max(0.0)
    }

    /// True when the liquid height reaches the top of the shell
    pub fn is_full(&self) -> bool {
        self.fill_fraction >= 1.0
    }
}

/// Volume of the full cylinder in liters.
///
/// # Example
/// ```rust
/// use dip_core::calculations::dip_volume::full_cylinder_volume;
///
/// let capacity = full_cylinder_volume(5.0, 2.0);
/// assert!((capacity - 15707.96).abs() < 0.01);
/// ```
pub fn full_cylinder_volume(inside_length_m: f64, inside_diameter_m: f64) -> f64 {
    let length_mm = Millimeters::from(Meters(inside_length_m));
    let radius_mm = Millimeters::from(Meters(inside_diameter_m)).0 / 2.0;
    SqMm(circle_area(radius_mm)).extrude(length_mm).0
}

/// Convert a dip reading into a liquid volume.
///
/// # Arguments
///
/// * `input` - Tank geometry and dip reading
///
/// # Returns
///
/// * `Ok(DipVolumeResult)` - Volume and supporting geometry
/// * `Err(DipError::InvalidInput)` - Geometry or dip is not usable
/// * `Err(DipError::CalculationFailed)` - The segment area was not a real number
pub fn calculate(input: &DipVolumeInput) -> DipResult<DipVolumeResult> {
    input.validate()?;

    let diameter_mm = Millimeters::from(Meters(input.inside_diameter_m)).0;
    let length_mm = Millimeters::from(Meters(input.inside_length_m));
    let radius_mm = diameter_mm / 2.0;
    let dip_mm = input.dip_mm();
    let h = dip_mm.min(diameter_mm);
    let clamped = dip_mm > diameter_mm;

    if clamped {
        debug!(
            "dip of {} mm exceeds inside diameter {} mm; treating tank as full",
            dip_mm, diameter_mm
        );
    }

    let full_area = circle_area(radius_mm);
    let capacity_l = SqMm(full_area).extrude(length_mm).0;

    let area = if h == 0.0 {
        0.0
    } else if h >= diameter_mm {
        full_area
    } else {
        segment_area(radius_mm, h)
    };

    if !area.is_finite() {
        return Err(DipError::calculation_failed(
            "dip volume",
            format!("segment area is not a real number (r = {} mm, h = {} mm)", radius_mm, h),
        ));
    }

    let volume_l = SqMm(area).extrude(length_mm).0;
    if !capacity_l.is_finite() || !volume_l.is_finite() {
        return Err(DipError::calculation_failed(
            "dip volume",
            format!(
                "volume overflows for a {} m x {} m tank",
                input.inside_length_m, input.inside_diameter_m
            ),
        ));
    }
    trace!("dip {} mm -> segment {} mm² -> {} L", h, area, volume_l);

    // Capacity underflows to zero for vanishingly small diameters.
    let fill_fraction = if capacity_l > 0.0 { volume_l / capacity_l } else { 0.0 };

    Ok(DipVolumeResult {
        volume_l,
        capacity_l,
        fill_fraction,
        dip_mm,
        liquid_height_mm: h,
        segment_area_mm2: area,
        clamped,
    })
}

/// Liquid volume in liters for a dip reading; `0.0` for any degenerate input.
///
/// This is the total form of [`calculate`]: a non-positive or NaN length or
/// diameter, a negative or NaN dip, or a volume too large for `f64` all give
/// zero instead of an error. Use [`calculate`] when an empty tank has to be
/// told apart from a misconfigured one.
///
/// # Example
/// ```rust
/// use dip_core::calculations::dip_volume::compute_volume;
///
/// assert_eq!(compute_volume(5.0, 2.0, 0.0), 0.0);
/// assert_eq!(compute_volume(0.0, 2.0, 5.0), 0.0);
/// assert_eq!(compute_volume(5.0, 2.0, -1.0), 0.0);
/// ```
pub fn compute_volume(inside_length_m: f64, inside_diameter_m: f64, dip_cm: f64) -> f64 {
    calculate(&DipVolumeInput::new(inside_length_m, inside_diameter_m, dip_cm))
        .map(|result| result.volume_l)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const LENGTH_M: f64 = 5.0;
    const DIAMETER_M: f64 = 2.0;

    fn full_volume(l: f64, d: f64) -> f64 {
        PI * (d * 500.0).powi(2) * (l * 1000.0) / 1e6
    }

    #[test]
    fn test_empty_tank() {
        assert_eq!(compute_volume(LENGTH_M, DIAMETER_M, 0.0), 0.0);
        assert_eq!(compute_volume(12.3, 0.7, 0.0), 0.0);
    }

    #[test]
    fn test_full_at_diameter() {
        let expected = full_volume(LENGTH_M, DIAMETER_M);
        assert_relative_eq!(expected, 15707.963, epsilon = 1e-3);
        assert_relative_eq!(compute_volume(LENGTH_M, DIAMETER_M, 200.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_dip_above_diameter_is_clamped() {
        let expected = full_volume(LENGTH_M, DIAMETER_M);
        assert_relative_eq!(compute_volume(LENGTH_M, DIAMETER_M, 250.0), expected, max_relative = 1e-12);

        let result = calculate(&DipVolumeInput::new(LENGTH_M, DIAMETER_M, 250.0)).unwrap();
        assert!(result.clamped);
        assert!(result.is_full());
        assert_eq!(result.liquid_height_mm, 2000.0);
        assert_eq!(result.dip_mm, 2500.0);
        assert_relative_eq!(result.ullage_l(), 0.0);
    }

    #[test]
    fn test_infinite_dip_reads_full() {
        let expected = full_volume(LENGTH_M, DIAMETER_M);
        assert_relative_eq!(compute_volume(LENGTH_M, DIAMETER_M, f64::INFINITY), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_half_full() {
        let half = compute_volume(LENGTH_M, DIAMETER_M, 100.0);
        assert_relative_eq!(half, 7853.98, epsilon = 0.01);
        assert_relative_eq!(half, full_volume(LENGTH_M, DIAMETER_M) / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_quarter_height_known_value() {
        // h = r/2: segment = r²(π/3 - √3/4)
        let r: f64 = 1000.0;
        let segment = r * r * (PI / 3.0 - 3f64.sqrt() / 4.0);
        let expected = segment * 5000.0 / 1e6;
        assert_relative_eq!(compute_volume(LENGTH_M, DIAMETER_M, 50.0), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_monotonic_in_dip() {
        let mut previous = 0.0;
        let mut dip = 0.0;
        while dip <= 200.0 {
            let v = compute_volume(LENGTH_M, DIAMETER_M, dip);
            assert!(v >= previous, "volume decreased at dip {} cm: {} < {}", dip, v, previous);
            previous = v;
            dip += 0.25;
        }
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        assert_eq!(compute_volume(0.0, DIAMETER_M, 5.0), 0.0);
        assert_eq!(compute_volume(LENGTH_M, 0.0, 5.0), 0.0);
        assert_eq!(compute_volume(LENGTH_M, DIAMETER_M, -1.0), 0.0);
        assert_eq!(compute_volume(f64::NAN, DIAMETER_M, 5.0), 0.0);
        assert_eq!(compute_volume(LENGTH_M, f64::NAN, 5.0), 0.0);
        assert_eq!(compute_volume(LENGTH_M, DIAMETER_M, f64::NAN), 0.0);
        assert_eq!(compute_volume(-3.0, DIAMETER_M, 5.0), 0.0);
        assert_eq!(compute_volume(f64::INFINITY, DIAMETER_M, 5.0), 0.0);
    }

    #[test]
    fn test_checked_errors_name_the_field() {
        let err = calculate(&DipVolumeInput::new(0.0, DIAMETER_M, 5.0)).unwrap_err();
        assert!(matches!(err, DipError::InvalidInput { ref field, .. } if field == "inside_length_m"));

        let err = calculate(&DipVolumeInput::new(LENGTH_M, f64::NAN, 5.0)).unwrap_err();
        assert!(matches!(err, DipError::InvalidInput { ref field, .. } if field == "inside_diameter_m"));

        let err = calculate(&DipVolumeInput::new(LENGTH_M, DIAMETER_M, -0.5)).unwrap_err();
        assert!(matches!(err, DipError::InvalidInput { ref field, .. } if field == "dip_cm"));
    }

    #[test]
    fn test_checked_empty_is_ok_not_error() {
        let result = calculate(&DipVolumeInput::new(LENGTH_M, DIAMETER_M, 0.0)).unwrap();
        assert_eq!(result.volume_l, 0.0);
        assert_eq!(result.fill_fraction, 0.0);
        assert!(!result.clamped);
        assert_relative_eq!(result.ullage_l(), result.capacity_l);
    }

    #[test]
    fn test_overflowing_length_reads_zero() {
        assert_eq!(compute_volume(1e306, 2.0, 0.0), 0.0);
        assert_eq!(compute_volume(1e306, 2.0, 100.0), 0.0);

        let err = calculate(&DipVolumeInput::new(1e306, 2.0, 100.0)).unwrap_err();
        assert_eq!(err.error_code(), "NON_REAL_VOLUME");
    }

    #[test]
    fn test_vanishing_diameter_has_real_fill_fraction() {
        let result = calculate(&DipVolumeInput::new(5.0, 1e-200, 0.0)).unwrap();
        assert_eq!(result.capacity_l, 0.0);
        assert_eq!(result.fill_fraction, 0.0);
        assert_eq!(compute_volume(5.0, 1e-200, 10.0), 0.0);
    }

    #[test]
    fn test_serialization() {
        let input = DipVolumeInput::new(LENGTH_M, DIAMETER_M, 87.5);
        let json = serde_json::to_string(&input).unwrap();
        let roundtrip: DipVolumeInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);
    }
}
