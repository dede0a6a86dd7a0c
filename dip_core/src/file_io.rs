//! # Station Files
//!
//! Saving and loading `.dip` station files:
//! - **Atomic saves**: write `<file>.dip.tmp`, fsync, rename over the target
//! - **Advisory locking**: an fs2 exclusive lock plus a `.dip.lock` sidecar
//!   recording who holds it, so two offices sharing a drive don't overwrite
//!   each other's tank data
//! - **Version validation**: refuse files written by an incompatible schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use dip_core::file_io::{load_station, save_station, FileLock};
//! use dip_core::station::Station;
//! use std::path::Path;
//!
//! let path = Path::new("highway.dip");
//! let lock = FileLock::acquire(path, "operator@station")?;
//! save_station(&Station::new("Highway Fuels", "R. Operator"), path)?;
//! let station = load_station(path)?;
//! drop(lock);
//! # Ok::<(), dip_core::errors::DipError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{DipError, DipResult};
use crate::station::{Station, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of owner.
const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.dip.lock` sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was taken
    pub machine: String,
    /// Process holding the lock
    pub pid: u32,
    /// When the lock was taken
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder has gone away (dead process on this machine, or too old).
    pub fn is_stale(&self) -> bool {
        if let Some(ours) = hostname() {
            if self.machine == ours && !process_alive(self.pid) {
                return true;
            }
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            !stdout.contains("No tasks") && stdout.contains(&pid.to_string())
        }
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Guard for an exclusive lock on a station file. Released on drop.
pub struct FileLock {
    station_path: PathBuf,
    lock_path: PathBuf,
    /// Holds the OS-level lock for as long as the guard lives
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a station file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(DipError::FileLocked)` - Another live process holds it
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> DipResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(DipError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(
                "taking over stale lock on '{}' held by {} since {}",
                path.display(),
                existing.user_id,
                existing.locked_at
            );
        }

        let lock_err = |operation: &str, e: std::io::Error| {
            DipError::file_error(operation, lock_path.display().to_string(), e.to_string())
        };

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| lock_err("create lock", e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            DipError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json =
            serde_json::to_string_pretty(&info).map_err(|e| DipError::serialization(e.to_string()))?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| lock_err("write lock", e))?;
        lock_file.sync_all().map_err(|e| lock_err("sync lock", e))?;

        debug!("locked '{}' for {}", path.display(), info.user_id);

        Ok(FileLock {
            station_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Report who holds a live lock on `path`, without taking it.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    /// The station file this lock guards
    pub fn station_path(&self) -> &Path {
        &self.station_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The OS lock goes with _lock_file; the sidecar has to be removed by hand.
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `station.dip` -> `station.dip.lock`
fn lock_path_for(station_path: &Path) -> PathBuf {
    let mut lock_path = station_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Sidecar contents, or `None` if there is no readable sidecar.
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a station with atomic write semantics.
///
/// The JSON is written to `<file>.dip.tmp`, synced, then renamed over
/// `path`, so an interrupted save never leaves a half-written station file.
pub fn save_station(station: &Station, path: &Path) -> DipResult<()> {
    let json =
        serde_json::to_string_pretty(station).map_err(|e| DipError::serialization(e.to_string()))?;

    let tmp_path = path.with_extension("dip.tmp");
    let tmp_err = |operation: &str, e: std::io::Error| {
        DipError::file_error(operation, tmp_path.display().to_string(), e.to_string())
    };

    let mut tmp_file = File::create(&tmp_path).map_err(|e| tmp_err("create temp file", e))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| tmp_err("write temp file", e))?;
    tmp_file.sync_all().map_err(|e| tmp_err("sync temp file", e))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DipError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(
        "saved station '{}' ({} tanks) to {}",
        station.meta.station_name,
        station.tank_count(),
        path.display()
    );
    Ok(())
}

/// Load a station file.
///
/// # Returns
///
/// * `Ok(Station)` - Loaded station
/// * `Err(DipError::VersionMismatch)` - Written by an incompatible schema
/// * `Err(DipError::SerializationError)` - Not valid station JSON
/// * `Err(DipError::FileError)` - I/O error
pub fn load_station(path: &Path) -> DipResult<Station> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DipError::file_error("read", path.display().to_string(), e.to_string()))?;

    let station: Station = serde_json::from_str(&contents)
        .map_err(|e| DipError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&station.meta.version)?;

    debug!(
        "loaded station '{}' with {} tanks from {}",
        station.meta.station_name,
        station.tank_count(),
        path.display()
    );
    Ok(station)
}

/// Load a station and report any live lock held on it by someone else.
pub fn load_station_with_lock_check(path: &Path) -> DipResult<(Station, Option<LockInfo>)> {
    let station = load_station(path)?;
    Ok((station, FileLock::check(path)))
}

/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> DipResult<()> {
    let mismatch = || DipError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([], _) | (_, []) => Err(mismatch()),
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        _ => Ok(()),
    }
}
