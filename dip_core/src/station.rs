//! # Station Data Structures
//!
//! The `Station` struct is the root container for a fuel station's tank
//! master data. Stations serialize to `.dip` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Station
//! ├── meta: StationMetadata (version, station name, operator, timestamps)
//! ├── settings: StationSettings (dip chart range, display decimals)
//! └── tanks: HashMap<Uuid, HorizontalCylinderTank>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dip_core::station::Station;
//! use dip_core::tank::HorizontalCylinderTank;
//!
//! let mut station = Station::new("Highway Fuels", "R. Operator");
//! let id = station
//!     .add_tank(HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0))
//!     .unwrap();
//! assert!(station.get_tank(&id).is_some());
//!
//! let json = serde_json::to_string_pretty(&station).unwrap();
//! assert!(json.contains("Highway Fuels"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::dip_chart::DipChartSettings;
use crate::errors::{DipError, DipResult};
use crate::tank::HorizontalCylinderTank;

/// Current schema version for .dip files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root station container.
///
/// Tanks are stored in a flat UUID-keyed map so dip entries can refer to a
/// tank by id even after it is renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Station metadata (version, name, operator)
    pub meta: StationMetadata,

    /// Station-wide settings
    #[serde(default)]
    pub settings: StationSettings,

    /// All tanks, keyed by UUID
    pub tanks: HashMap<Uuid, HorizontalCylinderTank>,
}

impl Station {
    /// Create a new station with no tanks.
    pub fn new(station_name: impl Into<String>, operator: impl Into<String>) -> Self {
        let now = Utc::now();
        Station {
            meta: StationMetadata {
                version: SCHEMA_VERSION.to_string(),
                station_name: station_name.into(),
                operator: operator.into(),
                created: now,
                modified: now,
            },
            settings: StationSettings::default(),
            tanks: HashMap::new(),
        }
    }

    /// Add a tank after validating it. Tank names must be unique
    /// (case-insensitive) within a station.
    ///
    /// Returns the UUID assigned to the tank.
    pub fn add_tank(&mut self, tank: HorizontalCylinderTank) -> DipResult<Uuid> {
        tank.validate()?;
        if self.find_tank_by_name(&tank.tank_name).is_some() {
            return Err(DipError::invalid_input(
                "tank_name",
                tank.tank_name.clone(),
                "A tank with this name already exists",
            ));
        }

        let id = Uuid::new_v4();
        info!("adding tank '{}' ({}) to station '{}'", tank.tank_name, id, self.meta.station_name);
        self.tanks.insert(id, tank);
        self.touch();
        Ok(id)
    }

    /// Remove a tank by UUID.
    ///
    /// Returns the removed tank if it existed.
    pub fn remove_tank(&mut self, id: &Uuid) -> Option<HorizontalCylinderTank> {
        let tank = self.tanks.remove(id);
        if tank.is_some() {
            self.touch();
        }
        tank
    }

    /// Get a tank by UUID.
    pub fn get_tank(&self, id: &Uuid) -> Option<&HorizontalCylinderTank> {
        self.tanks.get(id)
    }

    /// Get a mutable reference to a tank by UUID.
    ///
    /// Marks the station as modified when the tank exists.
    pub fn get_tank_mut(&mut self, id: &Uuid) -> Option<&mut HorizontalCylinderTank> {
        if self.tanks.contains_key(id) {
            self.meta.modified = Utc::now();
            self.tanks.get_mut(id)
        } else {
            None
        }
    }

    /// Find a tank by name, ignoring case and surrounding whitespace.
    pub fn find_tank_by_name(&self, name: &str) -> Option<(Uuid, &HorizontalCylinderTank)> {
        let wanted = name.trim().to_lowercase();
        self.tanks
            .iter()
            .find(|(_, tank)| tank.tank_name.trim().to_lowercase() == wanted)
            .map(|(id, tank)| (*id, tank))
    }

    /// Like [`find_tank_by_name`](Self::find_tank_by_name) but an error when missing.
    pub fn require_tank(&self, name: &str) -> DipResult<(Uuid, &HorizontalCylinderTank)> {
        self.find_tank_by_name(name)
            .ok_or_else(|| DipError::tank_not_found(name))
    }

    /// All tanks ordered by name, for listings and reports.
    pub fn tanks_sorted(&self) -> Vec<(Uuid, &HorizontalCylinderTank)> {
        let mut tanks: Vec<_> = self.tanks.iter().map(|(id, tank)| (*id, tank)).collect();
        tanks.sort_by(|a, b| a.1.tank_name.cmp(&b.1.tank_name));
        tanks
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn tank_count(&self) -> usize {
        self.tanks.len()
    }
}

impl Default for Station {
    fn default() -> Self {
        Station::new("", "")
    }
}

/// Station metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Station name printed on dip charts
    pub station_name: String,

    /// Person responsible for the station's records
    pub operator: String,

    /// When the station file was created
    pub created: DateTime<Utc>,

    /// When the station file was last modified
    pub modified: DateTime<Utc>,
}

/// Station-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSettings {
    /// Range used when printing dip charts
    pub dip_chart: DipChartSettings,

    /// Decimal places for volumes in listings
    pub volume_decimals: usize,
}

impl Default for StationSettings {
    fn default() -> Self {
        StationSettings {
            dip_chart: DipChartSettings::default(),
            volume_decimals: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diesel() -> HorizontalCylinderTank {
        HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0)
    }

    #[test]
    fn test_station_creation() {
        let station = Station::new("Highway Fuels", "R. Operator");
        assert_eq!(station.meta.station_name, "Highway Fuels");
        assert_eq!(station.meta.operator, "R. Operator");
        assert_eq!(station.meta.version, SCHEMA_VERSION);
        assert_eq!(station.settings.dip_chart, DipChartSettings::default());
    }

    #[test]
    fn test_add_remove_tank() {
        let mut station = Station::new("S", "O");
        let id = station.add_tank(diesel()).unwrap();
        assert_eq!(station.tank_count(), 1);
        assert!(station.get_tank(&id).is_some());

        let removed = station.remove_tank(&id);
        assert_eq!(removed, Some(diesel()));
        assert_eq!(station.tank_count(), 0);
        assert!(station.remove_tank(&id).is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut station = Station::new("S", "O");
        station.add_tank(diesel()).unwrap();
        let dup = HorizontalCylinderTank::new("t-1 ", "Petrol", 4.0, 1.8);
        assert!(station.add_tank(dup).is_err());
    }

    #[test]
    fn test_invalid_tank_rejected() {
        let mut station = Station::new("S", "O");
        let bad = HorizontalCylinderTank::new("T-2", "Petrol", -1.0, 1.8);
        assert!(station.add_tank(bad).is_err());
        assert_eq!(station.tank_count(), 0);
    }

    #[test]
    fn test_find_and_require() {
        let mut station = Station::new("S", "O");
        let id = station.add_tank(diesel()).unwrap();
        assert_eq!(station.find_tank_by_name("T-1").map(|(i, _)| i), Some(id));
        assert_eq!(station.find_tank_by_name("  t-1").map(|(i, _)| i), Some(id));
        assert_eq!(station.require_tank("T-7").unwrap_err(), DipError::tank_not_found("T-7"));
    }

    #[test]
    fn test_get_tank_mut_touches() {
        let mut station = Station::new("S", "O");
        let id = station.add_tank(diesel()).unwrap();
        let before = station.meta.modified;
        station.get_tank_mut(&id).unwrap().product_name = "HSD".to_string();
        assert!(station.meta.modified >= before);
        assert_eq!(station.get_tank(&id).unwrap().product_name, "HSD");
    }

    #[test]
    fn test_tanks_sorted() {
        let mut station = Station::new("S", "O");
        station.add_tank(HorizontalCylinderTank::new("T-3", "Petrol", 4.0, 1.8)).unwrap();
        station.add_tank(diesel()).unwrap();
        let names: Vec<_> = station.tanks_sorted().iter().map(|(_, t)| t.tank_name.clone()).collect();
        assert_eq!(names, vec!["T-1", "T-3"]);
    }

    #[test]
    fn test_station_serialization() {
        let mut station = Station::new("Highway Fuels", "R. Operator");
        station.add_tank(diesel()).unwrap();
        let json = serde_json::to_string_pretty(&station).unwrap();
        assert!(json.contains("Highway Fuels"));
        assert!(json.contains("\"step_cm\": 0.5"));

        let roundtrip: Station = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.tank_count(), 1);
        assert_eq!(roundtrip.meta.operator, "R. Operator");
    }

    #[test]
    fn test_missing_settings_default() {
        let station = Station::new("S", "O");
        let mut value = serde_json::to_value(&station).unwrap();
        value.as_object_mut().unwrap().remove("settings");
        let parsed: Station = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.settings.volume_decimals, 2);
    }
}
