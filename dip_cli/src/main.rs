//! # Tankdip CLI
//!
//! Command line front end for `dip_core`: convert dips to liters, print or
//! export dip charts, reconcile stock, and maintain `.dip` station files.
//!
//! ```text
//! dip volume --length-m 5 --diameter-m 2 --dip-cm 87.5
//! dip chart --length-m 5 --diameter-m 2 --step 1
//! dip station highway.dip init --name "Highway Fuels" --operator "R. Operator"
//! dip station highway.dip add-tank --name T-1 --product Diesel --length-m 5 --diameter-m 2
//! dip station highway.dip report -o highway.pdf
//! ```
//!
//! Set `RUST_LOG=debug` for calculation and file logging.

mod console;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dip_core::calculations::dip_chart::{self, DipChartSettings};
use dip_core::calculations::dip_volume::{self, DipVolumeInput};
use dip_core::calculations::stock::{self, DipEntry, StockReconciliationInput};
use dip_core::errors::DipError;
use dip_core::file_io::{load_station, load_station_with_lock_check, save_station, FileLock};
use dip_core::pdf::{render_dip_chart_pdf, render_station_pdf};
use dip_core::station::Station;
use dip_core::tank::HorizontalCylinderTank;
use log::{debug, warn};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "dip", about = "Tank dip-to-volume calculator and dip chart generator")]
struct Opts {
    #[structopt(subcommand)]
    cmd: Command,
}

/// Inside dimensions of a horizontal cylindrical tank
#[derive(Debug, StructOpt)]
struct GeometryOpts {
    /// Inside length of the tank in meters
    #[structopt(long)]
    length_m: f64,

    /// Inside diameter of the tank in meters
    #[structopt(long)]
    diameter_m: f64,
}

/// Dip chart range; unset values fall back to the defaults (1 - 200 cm, 0.5 cm steps)
#[derive(Debug, StructOpt)]
struct RangeOpts {
    /// First dip in centimeters
    #[structopt(long)]
    start: Option<f64>,

    /// Last dip in centimeters (inclusive)
    #[structopt(long)]
    end: Option<f64>,

    /// Step between rows in centimeters
    #[structopt(long)]
    step: Option<f64>,
}

impl RangeOpts {
    fn apply(&self, mut settings: DipChartSettings) -> DipChartSettings {
        if let Some(start) = self.start {
            settings.start_cm = start;
        }
        if let Some(end) = self.end {
            settings.end_cm = end;
        }
        if let Some(step) = self.step {
            settings.step_cm = step;
        }
        settings
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Liquid volume for a single dip reading
    Volume {
        #[structopt(flatten)]
        geometry: GeometryOpts,

        /// Dip reading in centimeters
        #[structopt(long)]
        dip_cm: f64,

        /// Print the result as JSON
        #[structopt(long)]
        json: bool,
    },

    /// Print a dip chart table
    Chart {
        #[structopt(flatten)]
        geometry: GeometryOpts,

        #[structopt(flatten)]
        range: RangeOpts,

        /// Print the chart as JSON
        #[structopt(long)]
        json: bool,
    },

    /// Write a dip chart PDF for a tank
    Pdf {
        #[structopt(flatten)]
        geometry: GeometryOpts,

        #[structopt(flatten)]
        range: RangeOpts,

        /// Tank name printed on the chart
        #[structopt(long)]
        name: String,

        /// Product stored in the tank
        #[structopt(long, default_value = "Fuel")]
        product: String,

        /// Name printed as the preparer
        #[structopt(long, default_value = "")]
        operator: String,

        /// Output PDF path
        #[structopt(short, long, parse(from_os_str))]
        output: PathBuf,
    },

    /// Compare stock between two dips against receipts and sales
    Reconcile {
        #[structopt(flatten)]
        geometry: GeometryOpts,

        /// Opening dip in centimeters
        #[structopt(long)]
        opening_dip_cm: f64,

        /// Closing dip in centimeters
        #[structopt(long)]
        closing_dip_cm: f64,

        /// Liters received during the period
        #[structopt(long, default_value = "0")]
        receipts_l: f64,

        /// Liters sold according to the nozzle meters
        #[structopt(long)]
        sales_l: f64,

        /// Print the result as JSON
        #[structopt(long)]
        json: bool,
    },

    /// Manage a station file
    Station(StationOpts),
}

#[derive(Debug, StructOpt)]
struct StationOpts {
    /// Station file (.dip)
    #[structopt(parse(from_os_str))]
    file: PathBuf,

    #[structopt(subcommand)]
    cmd: StationCommand,
}

#[derive(Debug, StructOpt)]
enum StationCommand {
    /// Create a new station file
    Init {
        /// Station name
        #[structopt(long)]
        name: String,

        /// Operator responsible for the records
        #[structopt(long, default_value = "")]
        operator: String,

        /// Overwrite an existing file
        #[structopt(long)]
        force: bool,
    },

    /// Add a tank to the station
    AddTank {
        /// Tank name (unique within the station)
        #[structopt(long)]
        name: String,

        /// Product stored in the tank
        #[structopt(long)]
        product: String,

        #[structopt(flatten)]
        geometry: GeometryOpts,
    },

    /// Remove a tank from the station
    RemoveTank {
        /// Tank name
        #[structopt(long)]
        tank: String,
    },

    /// List the station's tanks
    List,

    /// Stock held in a station tank at a dip
    Dip {
        /// Tank name
        #[structopt(long)]
        tank: String,

        /// Dip reading in centimeters
        #[structopt(long)]
        dip_cm: f64,

        /// Print the reading as JSON
        #[structopt(long)]
        json: bool,
    },

    /// Print a station tank's dip chart, or write it as a PDF with -o
    Chart {
        /// Tank name
        #[structopt(long)]
        tank: String,

        #[structopt(flatten)]
        range: RangeOpts,

        /// Output PDF path
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// Write dip charts for every tank to one PDF
    Report {
        /// Output PDF path
        #[structopt(short, long, parse(from_os_str))]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = Opts::from_args();
    debug!("{:?}", opts);

    if let Err(e) = run(opts) {
        match e.downcast_ref::<DipError>() {
            Some(dip) => {
                eprintln!("Error [{}]: {:#}", dip.error_code(), e);
                if dip.is_recoverable() {
                    eprintln!("Try again once the other editor has closed the file.");
                }
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> Result<()> {
    match opts.cmd {
        Command::Volume { geometry, dip_cm, json } => {
            let input = DipVolumeInput::new(geometry.length_m, geometry.diameter_m, dip_cm);
            let result = dip_volume::calculate(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                console::print_volume(&input, &result);
            }
        }

        Command::Chart { geometry, range, json } => {
            let settings = range.apply(DipChartSettings::default());
            let chart = dip_chart::generate(geometry.length_m, geometry.diameter_m, &settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else {
                console::print_chart(&chart, 2);
            }
        }

        Command::Pdf { geometry, range, name, product, operator, output } => {
            let tank = HorizontalCylinderTank::new(name, product, geometry.length_m, geometry.diameter_m);
            tank.validate()?;
            let chart = tank.dip_chart(&range.apply(DipChartSettings::default()))?;
            let pdf = render_dip_chart_pdf(&tank, &chart, &operator)?;
            write_pdf(&output, &pdf)?;
        }

        Command::Reconcile {
            geometry,
            opening_dip_cm,
            closing_dip_cm,
            receipts_l,
            sales_l,
            json,
        } => {
            let tank = HorizontalCylinderTank::new("tank", "product", geometry.length_m, geometry.diameter_m);
            let input = StockReconciliationInput {
                opening_dip_cm,
                closing_dip_cm,
                receipts_l,
                sales_l,
            };
            let result = stock::reconcile(&tank, &input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                console::print_reconciliation(&result);
            }
        }

        Command::Station(station) => run_station(&station.file, station.cmd)?,
    }
    Ok(())
}

fn run_station(path: &Path, cmd: StationCommand) -> Result<()> {
    match cmd {
        StationCommand::Init { name, operator, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let _lock = lock(path)?;
            save_station(&Station::new(name, operator), path)?;
            println!("Created station file {}", path.display());
        }

        StationCommand::AddTank { name, product, geometry } => {
            let _lock = lock(path)?;
            let mut station = load(path)?;
            let tank = HorizontalCylinderTank::new(name, product, geometry.length_m, geometry.diameter_m);
            let label = tank.tank_name.clone();
            let id = station.add_tank(tank)?;
            save_station(&station, path)?;
            println!("Added tank {} ({})", label, id);
        }

        StationCommand::RemoveTank { tank } => {
            let _lock = lock(path)?;
            let mut station = load(path)?;
            let (id, _) = station.require_tank(&tank)?;
            station.remove_tank(&id);
            save_station(&station, path)?;
            println!("Removed tank {}", tank);
        }

        StationCommand::List => {
            let (station, lock_info) = load_station_with_lock_check(path)
                .with_context(|| format!("loading {}", path.display()))?;
            if let Some(info) = lock_info {
                warn!("{} is being edited by {} on {}", path.display(), info.user_id, info.machine);
            }
            console::print_station(&station);
        }

        StationCommand::Dip { tank, dip_cm, json } => {
            let station = load(path)?;
            let (id, record) = station.require_tank(&tank)?;
            let reading = stock::stock_reading(record, &DipEntry::now(id, dip_cm))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reading)?);
            } else {
                console::print_stock_reading(record, &reading, station.settings.volume_decimals);
            }
        }

        StationCommand::Chart { tank, range, output } => {
            let station = load(path)?;
            let (_, record) = station.require_tank(&tank)?;
            let chart = record.dip_chart(&range.apply(station.settings.dip_chart))?;
            match output {
                Some(out) => {
                    let pdf = render_dip_chart_pdf(record, &chart, &station.meta.operator)?;
                    write_pdf(&out, &pdf)?;
                }
                None => console::print_chart(&chart, station.settings.volume_decimals),
            }
        }

        StationCommand::Report { output } => {
            let station = load(path)?;
            let pdf = render_station_pdf(&station)?;
            write_pdf(&output, &pdf)?;
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Station> {
    load_station(path).with_context(|| format!("loading {}", path.display()))
}

fn lock(path: &Path) -> Result<FileLock> {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    FileLock::acquire(path, user).with_context(|| format!("locking {}", path.display()))
}

fn write_pdf(path: &Path, pdf: &[u8]) -> Result<()> {
    fs::write(path, pdf).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), pdf.len());
    Ok(())
}
