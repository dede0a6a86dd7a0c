//! # Error Types
//!
//! Structured error types for dip_core. Every variant carries enough context
//! to tell a misconfigured tank apart from a bad reading, which the plain
//! [`compute_volume`](crate::calculations::dip_volume::compute_volume) entry
//! point cannot do.
//!
//! ## Example
//!
//! ```rust
//! use dip_core::errors::{DipError, DipResult};
//!
//! fn validate_dip(dip_cm: f64) -> DipResult<()> {
//!     if !(dip_cm >= 0.0) {
//!         return Err(DipError::invalid_input(
//!             "dip_cm",
//!             dip_cm.to_string(),
//!             "Dip must be a non-negative number",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_dip(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for dip_core operations
pub type DipResult<T> = Result<T, DipError>;

/// Structured error type for dip calculations, station files and reports.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DipError {
    /// An input value is invalid (negative, zero, NaN, out of range)
    #[error("Bad value for '{field}' ({value}): {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing or empty
    #[error("'{field}' must not be empty")]
    MissingField { field: String },

    /// No tank with the given name or id exists in the station
    #[error("No tank named '{tank}' in this station")]
    TankNotFound { tank: String },

    /// Geometry produced a NaN or infinite volume
    #[error("{calculation_type} did not produce a real volume: {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// Station file could not be read or written
    #[error("Could not {operation} '{path}': {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Another attendant or process is editing the station file
    #[error("'{path}' is being edited by {locked_by} (since {locked_at})")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// Station JSON could not be encoded or decoded
    #[error("Bad station data: {reason}")]
    SerializationError { reason: String },

    /// Station file written by an incompatible schema
    #[error("Station file schema {file_version} is not readable by schema {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Dip chart report could not be typeset or exported
    #[error("Report failed: {message}")]
    Report { message: String },
}

impl DipError {
    /// `field` held `value`, which breaks `reason`.
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        DipError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        DipError::MissingField {
            field: field.into(),
        }
    }

    pub fn tank_not_found(tank: impl Into<String>) -> Self {
        DipError::TankNotFound { tank: tank.into() }
    }

    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        DipError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// `operation` is a verb phrase: "read", "rename to final", ...
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        DipError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        DipError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    pub fn serialization(reason: impl Into<String>) -> Self {
        DipError::SerializationError {
            reason: reason.into(),
        }
    }

    /// The same command may succeed once the other editor closes the file.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DipError::FileLocked { .. })
    }

    /// Stable code printed by the CLI and usable by scripts.
    pub fn error_code(&self) -> &'static str {
        match self {
            DipError::InvalidInput { .. } => "INVALID_INPUT",
            DipError::MissingField { .. } => "MISSING_FIELD",
            DipError::TankNotFound { .. } => "TANK_NOT_FOUND",
            DipError::CalculationFailed { .. } => "NON_REAL_VOLUME",
            DipError::FileError { .. } => "FILE_ERROR",
            DipError::FileLocked { .. } => "FILE_LOCKED",
            DipError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DipError::VersionMismatch { .. } => "VERSION_MISMATCH",
            DipError::Report { .. } => "REPORT_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_serializes_with_type_tag() {
        let error = DipError::invalid_input("inside_diameter_m", "0", "Diameter must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: DipError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DipError::missing_field("tank_name").error_code(), "MISSING_FIELD");
        assert_eq!(DipError::tank_not_found("T-1").error_code(), "TANK_NOT_FOUND");
        assert_eq!(
            DipError::calculation_failed("dip volume", "NaN area").error_code(),
            "NON_REAL_VOLUME"
        );
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(DipError::file_locked("a.dip", "someone", "now").is_recoverable());
        assert!(!DipError::serialization("bad json").is_recoverable());
    }

    #[test]
    fn test_display_names_field() {
        let error = DipError::invalid_input("dip_cm", "-1", "Dip must be a non-negative number");
        assert_eq!(
            error.to_string(),
            "Bad value for 'dip_cm' (-1): Dip must be a non-negative number"
        );
    }
}
