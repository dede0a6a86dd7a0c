//! # PDF Generation Module
//!
//! Printable dip charts rendered with Typst.
//!
//! ## Architecture
//!
//! - Typst source is assembled from string templates
//! - User text (tank, product, station names) is escaped before injection
//! - Fonts come from `typst-assets`; nothing is read from disk
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use dip_core::calculations::dip_chart::DipChartSettings;
//! use dip_core::pdf::render_dip_chart_pdf;
//! use dip_core::tank::HorizontalCylinderTank;
//!
//! let tank = HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0);
//! let chart = tank.dip_chart(&DipChartSettings::default()).unwrap();
//! let pdf = render_dip_chart_pdf(&tank, &chart, "R. Operator").unwrap();
//! std::fs::write("t1_dip_chart.pdf", pdf).unwrap();
//! ```

use chrono::{Datelike, Utc};
use log::info;
use typst::diag::{FileError, FileResult, SourceDiagnostic};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::dip_chart::DipChart;
use crate::equations::registry::{dip_chart_equations, generate_appendix_typst};
use crate::errors::{DipError, DipResult};
use crate::station::Station;
use crate::tank::HorizontalCylinderTank;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world: one in-memory source and the bundled fonts.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let today = Utc::now().date_naive();
        Datetime::from_ymd(today.year(), u8::try_from(today.month()).ok()?, u8::try_from(today.day()).ok()?)
    }
}

fn report_error(stage: &str, diagnostics: &[SourceDiagnostic]) -> DipError {
    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    DipError::Report {
        message: format!("{}: {}", stage, messages.join("; ")),
    }
}

/// Compile Typst source to PDF bytes.
fn compile_pdf(source: String) -> DipResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let document: PagedDocument = typst::compile(&world)
        .output
        .map_err(|errors| report_error("typesetting the dip chart", &errors))?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| report_error("exporting PDF", &errors))
}

// ============================================================================
// Templates
// ============================================================================

/// Page setup shared by every document. `{{FOOTER_LEFT}}` and `{{DATE}}` are filled in.
const PAGE_SETUP: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 18mm, bottom: 18mm, left: 15mm, right: 15mm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[Tankdip Dip Charts]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(3pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{FOOTER_LEFT}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 9pt)
"##;

/// One tank's dip chart section.
const CHART_TEMPLATE: &str = r##"
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 10pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Dip Chart]
    #v(3pt)
    #text(size: 12pt)[{{TANK_NAME}} - {{PRODUCT}}]
  ]
]

#v(8pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 16pt,
  table(
    columns: (auto, 1fr),
    stroke: none,
    row-gutter: 3pt,
    [Inside length:], [{{LENGTH_M}} m],
    [Inside diameter:], [{{DIAMETER_M}} m],
    [Capacity:], [{{CAPACITY_L}} L],
  ),
  table(
    columns: (auto, 1fr),
    stroke: none,
    row-gutter: 3pt,
    [Prepared by:], [{{OPERATOR}}],
    [Dip range:], [{{START_CM}} - {{END_CM}} cm, step {{STEP_CM}} cm],
    [Full at dip:], [{{FULL_DIP_CM}} cm],
  ),
)

#v(8pt)

#columns(3, gutter: 10pt)[
  #table(
    columns: (auto, 1fr, auto),
    inset: 3pt,
    stroke: 0.4pt,
    align: (right, right, right),
    table.header([*Dip cm*], [*Volume L*], [*Incr.*]),
{{ROWS}}
  )
]

#v(6pt)
#text(size: 8pt, fill: gray)[
  Increment = (V(dip + {{PROBE_CM}}) - V(dip)) / {{PROBE_CM}}. Horizontal cylinder with flat ends;
  verify against the tank manufacturer's calibration before use in trade.
]
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render a single tank's dip chart to PDF.
///
/// # Arguments
///
/// * `tank` - The tank the chart was generated for
/// * `chart` - The generated chart
/// * `operator` - Name printed as the preparer
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(DipError)` - If the tank is invalid or rendering fails
pub fn render_dip_chart_pdf(tank: &HorizontalCylinderTank, chart: &DipChart, operator: &str) -> DipResult<Vec<u8>> {
    tank.validate()?;

    let mut source = page_setup(&format!("Tank: {}", escape_typst(&tank.tank_name)));
    source.push_str(&chart_section(tank, chart, operator));
    source.push_str(&generate_appendix_typst(&dip_chart_equations()));

    let pdf = compile_pdf(source)?;
    info!(
        "rendered dip chart PDF for tank '{}' ({} rows, {} bytes)",
        tank.tank_name,
        chart.rows.len(),
        pdf.len()
    );
    Ok(pdf)
}

/// Render every tank in a station to a single PDF.
///
/// A cover page lists the tanks by name; each tank's chart follows on its
/// own page, using the station's dip chart settings.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(DipError)` - If the station has no tanks, a chart fails, or rendering fails
pub fn render_station_pdf(station: &Station) -> DipResult<Vec<u8>> {
    let tanks = station.tanks_sorted();
    if tanks.is_empty() {
        return Err(DipError::Report {
            message: "Station has no tanks to export".to_string(),
        });
    }

    let mut charts = Vec::with_capacity(tanks.len());
    for (_, tank) in &tanks {
        let chart = tank.dip_chart(&station.settings.dip_chart).map_err(|e| DipError::Report {
            message: format!("Failed to chart tank '{}': {}", tank.tank_name, e),
        })?;
        charts.push((*tank, chart));
    }

    let mut source = page_setup(&format!("Station: {}", escape_typst(&station.meta.station_name)));
    source.push_str(&format!(
        r##"
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 18pt, radius: 4pt)[
    #text(size: 22pt, weight: "bold")[Tank Dip Charts]
    #v(6pt)
    #text(size: 14pt)[{station}]
  ]
]

#v(16pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 4pt,
  [Operator:], [{operator}],
  [Date:], [{date}],
  [Tanks:], [{count}],
)

#v(16pt)

== Tank Summary

#table(
  columns: (auto, 1fr, 1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (right, left, left, right, right, right),
  table.header([*No.*], [*Tank*], [*Product*], [*Length m*], [*Diameter m*], [*Capacity L*]),
{summary_rows}
)
"##,
        station = escape_typst(&station.meta.station_name),
        operator = escape_typst(&station.meta.operator),
        date = Utc::now().format("%Y-%m-%d"),
        count = tanks.len(),
        summary_rows = build_summary_rows(&charts),
    ));

    for (tank, chart) in &charts {
        source.push_str("\n#pagebreak()\n");
        source.push_str(&chart_section(tank, chart, &station.meta.operator));
    }

    source.push_str(&generate_appendix_typst(&dip_chart_equations()));

    let pdf = compile_pdf(source)?;
    info!(
        "rendered station PDF for '{}' ({} tanks, {} bytes)",
        station.meta.station_name,
        charts.len(),
        pdf.len()
    );
    Ok(pdf)
}

fn page_setup(footer_left: &str) -> String {
    PAGE_SETUP
        .replace("{{FOOTER_LEFT}}", footer_left)
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
}

fn chart_section(tank: &HorizontalCylinderTank, chart: &DipChart, operator: &str) -> String {
    CHART_TEMPLATE
        .replace("{{TANK_NAME}}", &escape_typst(&tank.tank_name))
        .replace("{{PRODUCT}}", &escape_typst(&tank.product_name))
        .replace("{{OPERATOR}}", &escape_typst(operator))
        .replace("{{LENGTH_M}}", &format!("{:.3}", chart.inside_length_m))
        .replace("{{DIAMETER_M}}", &format!("{:.3}", chart.inside_diameter_m))
        .replace("{{CAPACITY_L}}", &format!("{:.2}", chart.capacity_l))
        .replace("{{START_CM}}", &format!("{:.1}", chart.settings.start_cm))
        .replace("{{END_CM}}", &format!("{:.1}", chart.settings.end_cm))
        .replace("{{STEP_CM}}", &format!("{}", chart.settings.step_cm))
        .replace("{{FULL_DIP_CM}}", &format!("{:.1}", chart.full_dip_cm))
        .replace("{{PROBE_CM}}", &format!("{}", chart.settings.probe_cm))
        .replace("{{ROWS}}", &build_chart_rows(chart))
}

/// Table cells for the chart body, one line per row.
fn build_chart_rows(chart: &DipChart) -> String {
    chart
        .rows
        .iter()
        .map(|row| {
            format!(
                "    [{:.1}], [{:.2}], [{:.3}],",
                row.dip_cm, row.volume_l, row.increment_per_mm
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary table rows for the station cover page
fn build_summary_rows(charts: &[(&HorizontalCylinderTank, DipChart)]) -> String {
    charts
        .iter()
        .enumerate()
        .map(|(i, (tank, chart))| {
            format!(
                "  [{}], [{}], [{}], [{:.3}], [{:.3}], [{:.2}],",
                i + 1,
                escape_typst(&tank.tank_name),
                escape_typst(&tank.product_name),
                tank.inside_length_m,
                tank.inside_diameter_m,
                chart.capacity_l
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '~' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::dip_chart::DipChartSettings;

    fn tank() -> HorizontalCylinderTank {
        HorizontalCylinderTank::new("T-1 #main", "Diesel", 5.0, 2.0)
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("T-1 #main"), "T-1 \\#main");
        assert_eq!(escape_typst("[a]_b"), "\\[a\\]\\_b");
        assert_eq!(escape_typst("plain text"), "plain text");
    }

    #[test]
    fn test_chart_rows_formatting() {
        let chart = tank().dip_chart(&DipChartSettings::default()).unwrap();
        let rows = build_chart_rows(&chart);
        assert_eq!(rows.lines().count(), 399);
        assert!(rows.lines().next().unwrap().trim_start().starts_with("[1.0], ["));
    }

    #[test]
    fn test_chart_section_fills_every_placeholder() {
        let t = tank();
        let chart = t.dip_chart(&DipChartSettings::default()).unwrap();
        let section = chart_section(&t, &chart, "R. Operator");
        assert!(!section.contains("{{"));
        assert!(section.contains("T-1 \\#main - Diesel"));
        assert!(section.contains("15707.96 L"));
    }

    #[test]
    fn test_tank_chart_renders() {
        let t = tank();
        let chart = t.dip_chart(&DipChartSettings::default()).unwrap();
        let pdf = render_dip_chart_pdf(&t, &chart, "R. Operator");

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_station_report_renders() {
        let mut station = Station::new("Highway Fuels", "R. Operator");
        station.add_tank(HorizontalCylinderTank::new("T-1", "Diesel", 5.0, 2.0)).unwrap();
        station.add_tank(HorizontalCylinderTank::new("T-2", "Petrol", 4.0, 1.8)).unwrap();

        let pdf = render_station_pdf(&station).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_station_is_an_error() {
        let station = Station::new("Empty", "Nobody");
        assert!(render_station_pdf(&station).is_err());
    }
}
