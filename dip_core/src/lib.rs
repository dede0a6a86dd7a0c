//! # dip_core - Tank Dip Calculation Engine
//!
//! `dip_core` converts dipstick readings taken in horizontal cylindrical fuel
//! tanks into liquid volumes, and builds the things a station needs around
//! that conversion: dip charts, stock reconciliation, station files and
//! printable PDF charts.
//!
//! ## Design
//!
//! - **Stateless**: calculations are pure functions of their inputs
//! - **JSON-First**: every input and result implements Serialize/Deserialize
//! - **Explicit errors**: checked entry points return [`DipError`] naming the bad field;
//!   [`compute_volume`] keeps the total "zero on bad input" contract
//!
//! ## Quick Start
//!
//! ```rust
//! use dip_core::compute_volume;
//!
//! // 5 m long, 2 m diameter, dipped at 100 cm (half full)
//! let liters = compute_volume(5.0, 2.0, 100.0);
//! assert!((liters - 7853.98).abs() < 0.01);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Dip volume, dip charts, stock reconciliation
//! - [`equations`] - Circular segment formulas and their registry
//! - [`tank`] - Tank master data and the [`Tank`] trait
//! - [`station`] - Station container persisted to `.dip` files
//! - [`file_io`] - Atomic saves and file locking
//! - [`pdf`] - Dip chart PDFs via Typst
//! - [`units`] - Unit newtypes
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod pdf;
pub mod station;
pub mod tank;
pub mod units;

pub use calculations::dip_chart::{DipChart, DipChartRow, DipChartSettings};
pub use calculations::dip_volume::{compute_volume, full_cylinder_volume, DipVolumeInput, DipVolumeResult};
pub use errors::{DipError, DipResult};
pub use file_io::{load_station, save_station, FileLock};
pub use station::{Station, StationMetadata, StationSettings};
pub use tank::{HorizontalCylinderTank, Level, Tank};
