//! # Dip Chart Generation
//!
//! A dip chart is the printed lookup table an attendant uses to turn a
//! dipstick reading into liters without a calculator: one row per dip step
//! with the volume at that dip and the volume added per unit of extra dip.
//!
//! ## Defaults
//!
//! Dips run from 1 cm to 200 cm inclusive in 0.5 cm steps (399 rows). The
//! increment column is the forward difference over a 0.1 cm probe scaled by
//! `1 / probe`, i.e. `(V(d + 0.1) - V(d)) * 10`.
//!
//! ## Example
//!
//! ```rust
//! use dip_core::calculations::dip_chart::{generate, DipChartSettings};
//!
//! let chart = generate(5.0, 2.0, &DipChartSettings::default()).unwrap();
//! assert_eq!(chart.rows.len(), 399);
//! assert_eq!(chart.rows[0].dip_cm, 1.0);
//! assert_eq!(chart.rows[398].dip_cm, 200.0);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calculations::dip_volume::{compute_volume, full_cylinder_volume, validate_geometry};
use crate::errors::{DipError, DipResult};
use crate::units::{Centimeters, Meters};

/// Guards the row count against `(end - start) / step` landing just below an integer.
const STEP_EPSILON: f64 = 1e-9;

/// Upper bound on rows in one chart.
pub const MAX_ROWS: usize = 100_000;

/// Range and resolution of a dip chart.
///
/// ## JSON Example
///
/// ```json
/// { "start_cm": 1.0, "end_cm": 200.0, "step_cm": 0.5, "probe_cm": 0.1 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipChartSettings {
    /// First dip in the chart (cm)
    pub start_cm: f64,

    /// Last dip in the chart, inclusive (cm)
    pub end_cm: f64,

    /// Distance between rows (cm)
    pub step_cm: f64,

    /// Probe used for the increment column (cm)
    pub probe_cm: f64,
}

impl Default for DipChartSettings {
    fn default() -> Self {
        DipChartSettings {
            start_cm: 1.0,
            end_cm: 200.0,
            step_cm: 0.5,
            probe_cm: 0.1,
        }
    }
}

impl DipChartSettings {
    /// Chart covering `0 ..= diameter` at the default resolution.
    pub fn full_range(inside_diameter_m: f64) -> Self {
        DipChartSettings {
            start_cm: 0.0,
            end_cm: Centimeters::from(Meters(inside_diameter_m)).0,
            ..DipChartSettings::default()
        }
    }

    /// Validate the chart range.
    pub fn validate(&self) -> DipResult<()> {
        if !(self.start_cm >= 0.0) || !self.start_cm.is_finite() {
            return Err(DipError::invalid_input(
                "start_cm",
                self.start_cm.to_string(),
                "Chart start must be a non-negative number",
            ));
        }
        if !(self.end_cm >= self.start_cm) || !self.end_cm.is_finite() {
            return Err(DipError::invalid_input(
                "end_cm",
                self.end_cm.to_string(),
                "Chart end must be a number no smaller than the start",
            ));
        }
        if !(self.step_cm > 0.0) || !self.step_cm.is_finite() {
            return Err(DipError::invalid_input(
                "step_cm",
                self.step_cm.to_string(),
                "Chart step must be positive",
            ));
        }
        if !(self.probe_cm > 0.0) || !self.probe_cm.is_finite() {
            return Err(DipError::invalid_input(
                "probe_cm",
                self.probe_cm.to_string(),
                "Increment probe must be positive",
            ));
        }
        if self.step_intervals() >= MAX_ROWS as f64 {
            return Err(DipError::invalid_input(
                "step_cm",
                self.step_cm.to_string(),
                format!("Chart would have more than {} rows", MAX_ROWS),
            ));
        }
        Ok(())
    }

    /// Number of rows the chart will hold, saturating at `MAX_ROWS + 1` for oversized ranges.
    pub fn row_count(&self) -> usize {
        let intervals = self.step_intervals().min(MAX_ROWS as f64);
        (intervals as usize).saturating_add(1)
    }

    /// Whole steps between start and end, before any integer cast.
    fn step_intervals(&self) -> f64 {
        ((self.end_cm - self.start_cm) / self.step_cm + STEP_EPSILON).floor()
    }

    /// Dip at row `index`, computed from the index so steps never drift.
    pub fn dip_at(&self, index: usize) -> f64 {
        self.start_cm + index as f64 * self.step_cm
    }
}

/// One line of a dip chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipChartRow {
    /// Dip reading (cm)
    pub dip_cm: f64,

    /// Liquid volume at this dip (L)
    pub volume_l: f64,

    /// `(V(dip + probe) - V(dip)) / probe`, never negative
    pub increment_per_mm: f64,
}

/// A generated dip chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipChart {
    /// Tank inside length (m)
    pub inside_length_m: f64,

    /// Tank inside diameter (m)
    pub inside_diameter_m: f64,

    /// Volume of the full tank (L)
    pub capacity_l: f64,

    /// Dip at which the tank reads full (cm)
    pub full_dip_cm: f64,

    /// Range the chart was generated over
    pub settings: DipChartSettings,

    /// Chart rows in ascending dip order
    pub rows: Vec<DipChartRow>,
}

impl DipChart {
    /// Volume for an arbitrary dip, interpolated linearly between rows.
    ///
    /// Returns `None` outside the charted range.
    pub fn lookup(&self, dip_cm: f64) -> Option<f64> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        if !(dip_cm >= first.dip_cm) || dip_cm > last.dip_cm {
            return None;
        }

        let upper = self.rows.partition_point(|row| row.dip_cm < dip_cm);
        let hi = self.rows[upper];
        if upper == 0 || hi.dip_cm == dip_cm {
            return Some(hi.volume_l);
        }
        let lo = self.rows[upper - 1];
        let t = (dip_cm - lo.dip_cm) / (hi.dip_cm - lo.dip_cm);
        Some(lo.volume_l + t * (hi.volume_l - lo.volume_l))
    }

    /// Rows whose dip is at or below the full-tank dip.
    pub fn rows_within_tank(&self) -> impl Iterator<Item = &DipChartRow> {
        let full = self.full_dip_cm;
        self.rows.iter().filter(move |row| row.dip_cm <= full)
    }
}

/// Generate a dip chart for a tank.
///
/// # Arguments
///
/// * `inside_length_m` - Tank inside length (m)
/// * `inside_diameter_m` - Tank inside diameter (m)
/// * `settings` - Dip range and resolution
///
/// # Returns
///
/// * `Ok(DipChart)` - One row per step, both range ends included
/// * `Err(DipError::InvalidInput)` - Bad geometry or chart settings
pub fn generate(inside_length_m: f64, inside_diameter_m: f64, settings: &DipChartSettings) -> DipResult<DipChart> {
    validate_geometry(inside_length_m, inside_diameter_m)?;
    settings.validate()?;

    let volume = |dip_cm: f64| compute_volume(inside_length_m, inside_diameter_m, dip_cm);

    let rows: Vec<DipChartRow> = (0..settings.row_count())
        .map(|i| {
            let dip_cm = settings.dip_at(i);
            let volume_l = volume(dip_cm);
            let increment = (volume(dip_cm + settings.probe_cm) - volume_l) / settings.probe_cm;
            DipChartRow {
                dip_cm,
                volume_l,
                increment_per_mm: increment.max(0.0),
            }
        })
        .collect();

    debug!(
        "generated dip chart for {} m x {} m tank: {} rows from {} to {} cm",
        inside_length_m,
        inside_diameter_m,
        rows.len(),
        settings.start_cm,
        settings.end_cm
    );

    Ok(DipChart {
        inside_length_m,
        inside_diameter_m,
        capacity_l: full_cylinder_volume(inside_length_m, inside_diameter_m),
        full_dip_cm: Centimeters::from(Meters(inside_diameter_m)).0,
        settings: *settings,
        rows,
    })
}
