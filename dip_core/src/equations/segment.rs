//! # Circular Segment Formulas
//!
//! Geometry of the wetted cross-section of a horizontal cylindrical tank.
//! The liquid surface is a chord; the liquid occupies the circular segment
//! below it.
//!
//! ```text
//!          .-~~~~~-.
//!        /           \
//!       |      O      |   O = centre, r = radius
//!       |~~~~~~~~~~~~~|   <- liquid surface (chord)
//!        \   /////   /    h = liquid height from bottom
//!          '-.....-'
//! ```
//!
//! ## Notation
//!
//! - `r` = radius
//! - `h` = liquid height measured from the bottom of the circle, `0 <= h <= 2r`
//! - `θ` = central angle subtended by the chord (radians)
//!
//! All functions are unit-agnostic: pass millimeters, get mm².
//!
//! ## References
//!
//! - Any geometry handbook, "area of a circular segment"

use std::f64::consts::PI;

/// Area of a full circle
///
/// # Formula
/// A = πr²
///
/// # Example
/// ```rust
/// use dip_core::equations::segment::circle_area;
///
/// let a = circle_area(1000.0);
/// assert!((a - 3_141_592.65).abs() < 0.01);
/// ```
#[inline]
pub fn circle_area(r: f64) -> f64 {
    PI * r * r
}

/// Central angle subtended by the chord at liquid height `h`
///
/// # Formula
/// θ = 2·acos((r − h) / r)
///
/// θ is 0 for an empty circle, π at half height and 2π when full.
/// Returns NaN when `h` lies outside `[0, 2r]`.
///
/// # Example
/// ```rust
/// use dip_core::equations::segment::central_angle;
///
/// let theta = central_angle(500.0, 500.0);
/// assert!((theta - std::f64::consts::PI).abs() < 1e-12);
/// ```
#[inline]
pub fn central_angle(r: f64, h: f64) -> f64 {
    2.0 * ((r - h) / r).acos()
}

/// Area of the circular sector with central angle `theta`
///
/// # Formula
/// A_sector = r²·θ / 2
#[inline]
pub fn sector_area(r: f64, theta: f64) -> f64 {
    r * r * theta / 2.0
}

/// Signed area of the triangle between the centre and the chord ends
///
/// # Formula
/// A_tri = (r − h)·√(2rh − h²)
///
/// Positive below half height (subtracted from the sector), negative above
/// it (the triangle is then added back).
#[inline]
pub fn chord_triangle_area(r: f64, h: f64) -> f64 {
    (r - h) * (2.0 * r * h - h * h).sqrt()
}

/// Area of the circular segment filled to height `h`
///
/// # Formula
/// A_seg = r²·θ/2 − (r − h)·√(2rh − h²)
///
/// # Arguments
/// * `r` - Radius
/// * `h` - Liquid height from the bottom, `0 <= h <= 2r`
///
/// # Example
/// ```rust
/// use dip_core::equations::segment::{circle_area, segment_area};
///
/// // Half full is exactly half the circle
/// let half = segment_area(1000.0, 1000.0);
/// assert!((half - circle_area(1000.0) / 2.0).abs() < 1e-6);
/// ```
pub fn segment_area(r: f64, h: f64) -> f64 {
    let theta = central_angle(r, h);
    sector_area(r, theta) - chord_triangle_area(r, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_segment_is_zero() {
        assert_relative_eq!(segment_area(1000.0, 0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_segment_is_circle() {
        assert_relative_eq!(segment_area(750.0, 1500.0), circle_area(750.0), max_relative = 1e-12);
    }

    #[test]
    fn test_complementary_segments_sum_to_circle() {
        let r = 1200.0;
        for h in [10.0, 250.0, 600.0, 1111.0, 2000.0] {
            let lower = segment_area(r, h);
            let upper = segment_area(r, 2.0 * r - h);
            assert_relative_eq!(lower + upper, circle_area(r), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_triangle_changes_sign_at_half_height() {
        assert!(chord_triangle_area(100.0, 50.0) > 0.0);
        assert_relative_eq!(chord_triangle_area(100.0, 100.0), 0.0);
        assert!(chord_triangle_area(100.0, 150.0) < 0.0);
    }

    #[test]
    fn test_angle_outside_circle_is_nan() {
        assert!(central_angle(100.0, 250.0).is_nan());
        assert!(segment_area(100.0, -5.0).is_nan());
    }
}
