//! Human-readable console output.

use dip_core::calculations::dip_chart::DipChart;
use dip_core::calculations::dip_volume::{DipVolumeInput, DipVolumeResult};
use dip_core::calculations::stock::{StockReading, StockReconciliation};
use dip_core::station::Station;
use dip_core::tank::{HorizontalCylinderTank, Tank};

const RULE: &str = "═══════════════════════════════════════";

fn banner(title: &str) {
    println!("{}", RULE);
    println!("  {}", title);
    println!("{}", RULE);
}

pub fn print_volume(input: &DipVolumeInput, result: &DipVolumeResult) {
    banner("DIP VOLUME");
    println!();
    println!("Tank:");
    println!("  Length:    {:.3} m", input.inside_length_m);
    println!("  Diameter:  {:.3} m", input.inside_diameter_m);
    println!("  Capacity:  {:.2} L", result.capacity_l);
    println!();
    println!("Reading:");
    println!("  Dip:       {:.1} cm", input.dip_cm);
    if result.clamped {
        println!("  (dip exceeds diameter; tank read as full)");
    }
    println!();
    println!("  Volume:    {:.2} L", result.volume_l);
    println!("  Ullage:    {:.2} L", result.ullage_l());
    println!("  Fill:      {:.1} %", result.fill_fraction * 100.0);
    println!("{}", RULE);
}

pub fn print_chart(chart: &DipChart, decimals: usize) {
    banner("DIP CHART");
    println!(
        "  {:.3} m x {:.3} m, capacity {:.2} L, full at {:.1} cm",
        chart.inside_length_m, chart.inside_diameter_m, chart.capacity_l, chart.full_dip_cm
    );
    println!();
    println!("{:>10}  {:>14}  {:>12}", "Dip cm", "Volume L", "Increment");
    for row in &chart.rows {
        println!(
            "{:>10.1}  {:>14.prec$}  {:>12.3}",
            row.dip_cm,
            row.volume_l,
            row.increment_per_mm,
            prec = decimals
        );
    }
}

pub fn print_reconciliation(result: &StockReconciliation) {
    banner("STOCK RECONCILIATION");
    println!();
    println!("  Opening stock:   {:>12.2} L", result.opening_volume_l);
    println!("  + Receipts:      {:>12.2} L", result.receipts_l);
    println!("  - Sales:         {:>12.2} L", result.sales_l);
    println!("  = Book closing:  {:>12.2} L", result.book_closing_l);
    println!("  Dip closing:     {:>12.2} L", result.closing_volume_l);
    println!();
    println!(
        "  Variance:        {:>12.2} L ({:+.2} % of sales) {}",
        result.variance_l,
        result.variance_percent,
        if result.is_loss() { "[LOSS]" } else { "[GAIN]" }
    );
    println!("{}", RULE);
}

pub fn print_station(station: &Station) {
    banner(&format!("STATION: {}", station.meta.station_name));
    println!("  Operator: {}", station.meta.operator);
    println!("  Modified: {}", station.meta.modified.format("%Y-%m-%d %H:%M UTC"));
    println!();

    if station.tank_count() == 0 {
        println!("  No tanks.");
        return;
    }

    let decimals = station.settings.volume_decimals;
    println!(
        "  {:<12} {:<12} {:>10} {:>12} {:>14}",
        "Tank", "Product", "Length m", "Diameter m", "Capacity L"
    );
    for (_, tank) in station.tanks_sorted() {
        println!(
            "  {:<12} {:<12} {:>10.3} {:>12.3} {:>14.prec$}",
            tank.tank_name,
            tank.product_name,
            tank.inside_length_m,
            tank.inside_diameter_m,
            tank.capacity().value(),
            prec = decimals
        );
    }
}

pub fn print_stock_reading(tank: &HorizontalCylinderTank, reading: &StockReading, decimals: usize) {
    banner(&format!("STOCK: {} ({})", tank.tank_name, tank.product_name));
    println!("  Dip:      {:.1} cm", reading.dip_cm);
    println!("  Volume:   {:.prec$} L", reading.volume_l, prec = decimals);
    println!("  Ullage:   {:.prec$} L", reading.ullage_l, prec = decimals);
    println!("  Taken at: {}", reading.recorded_at.format("%Y-%m-%d %H:%M UTC"));
}
