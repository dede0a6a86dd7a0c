//! # Tank Geometry Equations
//!
//! The formulas behind the dip-to-volume conversion, kept in one place so
//! they can be checked by hand and printed in dip chart appendices.
//!
//! ## Modules
//!
//! - [`segment`] - Circle, sector and segment areas
//! - [`registry`] - Equation metadata for PDF appendices and EQUATIONS.md
//!
//! ## Conventions
//!
//! - Liquid height is measured upward from the lowest point of the shell
//! - Geometry is evaluated in millimeters; volumes are converted to liters last

pub mod registry;
pub mod segment;

pub use segment::{central_angle, chord_triangle_area, circle_area, sector_area, segment_area};

pub use registry::{
    dip_chart_equations,
    generate_appendix_typst,
    generate_equations_markdown,
    Equation,
    EquationCategory,
    EquationMetadata,
    Variable,
    ALL_EQUATIONS,
};
