//! End-to-end checks across the public API: a station is built, saved,
//! reloaded and used for charts, stock readings and reconciliation.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use dip_core::calculations::stock::{self, DipEntry, StockReconciliationInput};
use dip_core::pdf::render_station_pdf;
use dip_core::units::Centimeters;
use dip_core::{
    compute_volume, full_cylinder_volume, load_station, save_station, DipChartSettings, DipError, FileLock,
    HorizontalCylinderTank, Station, Tank,
};

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dip_core_it_{}_{}", name, std::process::id()));
    let _ = fs::create_dir_all(&dir);
    dir.join("station.dip")
}

fn sample_station() -> Station {
    let mut station = Station::new("Highway Fuels", "R. Operator");
    station
        .add_tank(HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0))
        .unwrap();
    station
        .add_tank(HorizontalCylinderTank::new("T-2", "Petrol", 6.0, 2.5))
        .unwrap();
    station
}

#[test]
fn test_station_round_trips_through_file() {
    let path = scratch_path("round_trip");
    let station = sample_station();

    save_station(&station, &path).unwrap();
    let loaded = load_station(&path).unwrap();

    assert_eq!(loaded.meta.station_name, "Highway Fuels");
    assert_eq!(loaded.tank_count(), 2);
    let (_, t2) = loaded.require_tank("t-2").unwrap();
    assert_eq!(t2.product_name, "Petrol");
    assert!(!path.with_extension("dip.tmp").exists());

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_second_lock_is_refused_until_first_is_dropped() {
    let path = scratch_path("locking");
    save_station(&sample_station(), &path).unwrap();

    let first = FileLock::acquire(&path, "alice").unwrap();
    match FileLock::acquire(&path, "bob") {
        Err(DipError::FileLocked { .. }) => {}
        other => panic!("expected FileLocked, got {:?}", other.map(|l| l.info.user_id.clone())),
    }
    drop(first);

    assert!(FileLock::acquire(&path, "bob").is_ok());
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_chart_agrees_with_single_dip_conversion() {
    let station = sample_station();
    let (_, tank) = station.require_tank("T-1").unwrap();
    let chart = tank.dip_chart(&DipChartSettings::default()).unwrap();

    assert_eq!(chart.rows.len(), 399);
    for row in chart.rows.iter().step_by(37) {
        assert_relative_eq!(row.volume_l, compute_volume(5.0, 2.0, row.dip_cm), epsilon = 1e-9);
    }

    let last = chart.rows.last().unwrap();
    assert_relative_eq!(last.volume_l, full_cylinder_volume(5.0, 2.0), epsilon = 1e-6);
    assert_relative_eq!(chart.lookup(100.0).unwrap(), 7853.98, epsilon = 0.01);
}

#[test]
fn test_trait_level_matches_checked_conversion() {
    let tank = HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0);
    let level = tank.level(Centimeters(50.0));
    let checked = tank.dip_volume(50.0).unwrap();

    assert_relative_eq!(level.volume().value(), checked.volume_l, epsilon = 1e-9);
    assert_relative_eq!(level.percentage(), checked.fill_fraction, epsilon = 1e-12);
    assert_relative_eq!(tank.capacity().value(), 15707.96, epsilon = 0.01);
}

#[test]
fn test_stock_reading_and_reconciliation_share_volumes() {
    let station = sample_station();
    let (id, tank) = station.require_tank("T-1").unwrap();

    let opening = stock::stock_reading(tank, &DipEntry::now(id, 150.0)).unwrap();
    let closing = stock::stock_reading(tank, &DipEntry::now(id, 100.0)).unwrap();
    assert_relative_eq!(opening.volume_l + opening.ullage_l, 15707.96, epsilon = 0.01);

    let sold = opening.volume_l - closing.volume_l;
    let result = stock::reconcile(
        tank,
        &StockReconciliationInput {
            opening_dip_cm: 150.0,
            closing_dip_cm: 100.0,
            receipts_l: 0.0,
            sales_l: sold,
        },
    )
    .unwrap();

    assert_relative_eq!(result.variance_l, 0.0, epsilon = 1e-6);
    assert!(result.within_tolerance(0.5));
}

#[test]
fn test_zero_contract_holds_for_degenerate_input() {
    assert_eq!(compute_volume(0.0, 2.0, 50.0), 0.0);
    assert_eq!(compute_volume(5.0, -2.0, 50.0), 0.0);
    assert_eq!(compute_volume(5.0, 2.0, -1.0), 0.0);
    assert_eq!(compute_volume(5.0, 2.0, 0.0), 0.0);
    assert_relative_eq!(compute_volume(5.0, 2.0, 500.0), 15707.96, epsilon = 0.01);
}

#[test]
fn test_station_report_renders_pdf() {
    let pdf = render_station_pdf(&sample_station()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
