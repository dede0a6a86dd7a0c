//! # Dip Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - a pure function returning `DipResult<*Result>`
//!
//! ## Available Calculations
//!
//! - [`dip_volume`] - Dip reading to liquid volume for a horizontal cylinder
//! - [`dip_chart`] - Dip → volume → increment lookup tables
//! - [`stock`] - Stock readings and opening/closing reconciliation

pub mod dip_chart;
pub mod dip_volume;
pub mod stock;

pub use dip_chart::{DipChart, DipChartRow, DipChartSettings};
pub use dip_volume::{calculate, compute_volume, full_cylinder_volume, DipVolumeInput, DipVolumeResult};
pub use stock::{reconcile, stock_reading, DipEntry, StockReading, StockReconciliation, StockReconciliationInput};
