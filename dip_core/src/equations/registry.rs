//! # Equation Registry
//!
//! Every formula the dip calculation uses, with the metadata needed to print
//! it in a dip chart appendix or in `EQUATIONS.md`.
//!
//! ## Usage
//!
//! ```rust
//! use dip_core::equations::registry::Equation;
//!
//! let meta = Equation::SegmentArea.metadata();
//! assert!(meta.formula_plain.contains("sqrt"));
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Equation Categories
// ============================================================================

/// Grouping used by the appendix and the markdown reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Plane geometry of the tank cross-section
    Geometry,
    /// Cross-section swept along the tank length
    Volume,
    /// Derived dip chart quantities
    DipChart,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Geometry => "Cross-Section Geometry",
            EquationCategory::Volume => "Volume",
            EquationCategory::DipChart => "Dip Chart",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Geometry => 1,
            EquationCategory::Volume => 2,
            EquationCategory::DipChart => 3,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol in Typst math notation (e.g., "r", "A_\"seg\"")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "mm", "L")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one formula.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// What the equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown
    pub formula_plain: &'static str,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All formulas used by dip calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    /// A = πr²
    CircleArea,
    /// θ = 2·acos((r − h)/r)
    CentralAngle,
    /// r²θ/2
    SectorArea,
    /// (r − h)·√(2rh − h²)
    ChordTriangleArea,
    /// Sector minus triangle
    SegmentArea,
    /// Segment area times length
    SegmentVolume,
    /// πr²L
    FullCylinderVolume,
    /// (V(d + 0.1) − V(d)) × 10
    IncrementPerMm,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::CircleArea => EquationMetadata {
                name: "Circle Area",
                description: "Cross-sectional area of the full tank shell",
                formula_typst: r#"$A = pi r^2$"#,
                formula_plain: "A = pi * r^2",
                variables: vec![
                    Variable::new("A", "Cross-sectional area", "mm²"),
                    Variable::new("r", "Inside radius (diameter / 2)", "mm"),
                ],
                assumptions: vec!["Circular shell, no internal obstructions"],
                category: EquationCategory::Geometry,
                source_module: "equations/segment.rs",
                source_function: "circle_area",
            },

            Equation::CentralAngle => EquationMetadata {
                name: "Central Angle",
                description: "Angle at the tank axis subtended by the liquid surface",
                formula_typst: r#"$theta = 2 arccos((r - h) / r)$"#,
                formula_plain: "theta = 2 * acos((r - h) / r)",
                variables: vec![
                    Variable::new("theta", "Central angle", "rad"),
                    Variable::new("r", "Inside radius", "mm"),
                    Variable::new("h", "Liquid height (dip, clamped to diameter)", "mm"),
                ],
                assumptions: vec!["0 <= h <= 2r"],
                category: EquationCategory::Geometry,
                source_module: "equations/segment.rs",
                source_function: "central_angle",
            },

            Equation::SectorArea => EquationMetadata {
                name: "Sector Area",
                description: "Area of the circular sector bounded by the chord ends",
                formula_typst: r#"$A_"sector" = (r^2 theta) / 2$"#,
                formula_plain: "A_sector = r^2 * theta / 2",
                variables: vec![
                    Variable::new("A_\"sector\"", "Sector area", "mm²"),
                    Variable::new("theta", "Central angle", "rad"),
                ],
                assumptions: vec![],
                category: EquationCategory::Geometry,
                source_module: "equations/segment.rs",
                source_function: "sector_area",
            },

            Equation::ChordTriangleArea => EquationMetadata {
                name: "Chord Triangle Area",
                description: "Signed area of the triangle between the tank axis and the chord ends",
                formula_typst: r#"$A_"tri" = (r - h) sqrt(2 r h - h^2)$"#,
                formula_plain: "A_tri = (r - h) * sqrt(2*r*h - h^2)",
                variables: vec![
                    Variable::new("A_\"tri\"", "Triangle area (negative above half height)", "mm²"),
                    Variable::new("h", "Liquid height", "mm"),
                ],
                assumptions: vec![],
                category: EquationCategory::Geometry,
                source_module: "equations/segment.rs",
                source_function: "chord_triangle_area",
            },

            Equation::SegmentArea => EquationMetadata {
                name: "Wetted Segment Area",
                description: "Cross-sectional area occupied by liquid at height h",
                formula_typst: r#"$A_"seg" = A_"sector" - A_"tri"$"#,
                formula_plain: "A_seg = r^2 * theta / 2 - (r - h) * sqrt(2*r*h - h^2)",
                variables: vec![
                    Variable::new("A_\"seg\"", "Wetted cross-section", "mm²"),
                ],
                assumptions: vec!["Liquid surface is level"],
                category: EquationCategory::Geometry,
                source_module: "equations/segment.rs",
                source_function: "segment_area",
            },

            Equation::SegmentVolume => EquationMetadata {
                name: "Liquid Volume",
                description: "Wetted cross-section swept along the tank length",
                formula_typst: r#"$V = (A_"seg" L) / 10^6$"#,
                formula_plain: "V = A_seg * L / 1e6",
                variables: vec![
                    Variable::new("V", "Liquid volume", "L"),
                    Variable::new("L", "Inside length", "mm"),
                ],
                assumptions: vec![
                    "Tank lies horizontal",
                    "Flat ends (end-cap volume not included)",
                    "1 L = 1,000,000 mm³",
                ],
                category: EquationCategory::Volume,
                source_module: "calculations/dip_volume.rs",
                source_function: "calculate",
            },

            Equation::FullCylinderVolume => EquationMetadata {
                name: "Tank Capacity",
                description: "Volume of the full cylinder, used for any dip at or above the diameter",
                formula_typst: r#"$V_"full" = (pi r^2 L) / 10^6$"#,
                formula_plain: "V_full = pi * r^2 * L / 1e6",
                variables: vec![
                    Variable::new("V_\"full\"", "Tank capacity", "L"),
                    Variable::new("L", "Inside length", "mm"),
                ],
                assumptions: vec!["Flat ends"],
                category: EquationCategory::Volume,
                source_module: "calculations/dip_volume.rs",
                source_function: "full_cylinder_volume",
            },

            Equation::IncrementPerMm => EquationMetadata {
                name: "Increment per Millimeter",
                description: "Volume added by one extra millimeter of dip at a chart row",
                formula_typst: r#"$Delta V = (V(d + 0.1) - V(d)) times 10$"#,
                formula_plain: "dV = (V(d + 0.1) - V(d)) * 10",
                variables: vec![
                    Variable::new("Delta V", "Increment per millimeter", "L/mm"),
                    Variable::new("d", "Dip reading", "cm"),
                ],
                assumptions: vec!["Forward difference over the chart probe (default 0.1 cm)"],
                category: EquationCategory::DipChart,
                source_module: "calculations/dip_chart.rs",
                source_function: "generate",
            },
        }
    }

    /// Get all equations in a specific category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .copied()
            .filter(|eq| eq.metadata().category == category)
            .collect()
    }

    /// Get all categories in sort order
    pub fn all_categories() -> Vec<EquationCategory> {
        let mut categories = vec![
            EquationCategory::Geometry,
            EquationCategory::Volume,
            EquationCategory::DipChart,
        ];
        categories.sort_by_key(|c| c.sort_order());
        categories
    }
}

/// Every registered equation, in registry order.
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::CircleArea,
    Equation::CentralAngle,
    Equation::SectorArea,
    Equation::ChordTriangleArea,
    Equation::SegmentArea,
    Equation::SegmentVolume,
    Equation::FullCylinderVolume,
    Equation::IncrementPerMm,
];

/// Equations printed with every dip chart.
pub fn dip_chart_equations() -> Vec<Equation> {
    ALL_EQUATIONS.to_vec()
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

/// Build the Typst source for an equations appendix.
pub fn generate_appendix_typst(equations: &[Equation]) -> String {
    let mut output = String::new();

    output.push_str(r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: Calculation Method]
  ]
]

#v(12pt)

#text(size: 10pt)[
  Volumes in this chart are computed for a horizontal cylindrical tank by treating
  the liquid cross-section as a circular segment and sweeping it along the tank length.
]

#v(16pt)
"##);

    if equations.is_empty() {
        output.push_str("#text(style: \"italic\")[No equations recorded.]\n");
        return output;
    }

    for category in Equation::all_categories() {
        let in_category: Vec<Equation> = equations
            .iter()
            .copied()
            .filter(|eq| eq.metadata().category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }

        output.push_str(&format!("\n== {}\n\n", category.display_name()));

        for equation in in_category {
            let meta = equation.metadata();

            output.push_str(&format!("=== {}\n\n", meta.name));
            output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
            output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));

            if !meta.variables.is_empty() {
                output.push_str("#table(\n");
                output.push_str("  columns: (auto, 1fr, auto),\n");
                output.push_str("  inset: 6pt,\n");
                output.push_str("  stroke: 0.5pt,\n");
                output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "  [${}$], [{}], [{}],\n",
                        escape_typst_math(var.symbol),
                        var.description,
                        var.units
                    ));
                }
                output.push_str(")\n\n");
            }

            if !meta.assumptions.is_empty() {
                output.push_str("*Assumptions:*\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption.replace('<', "\\<").replace('>', "\\>")));
                }
                output.push('\n');
            }

            output.push_str("#v(8pt)\n");
        }
    }

    output
}

fn escape_typst_math(s: &str) -> String {
    s.replace('\\', "\\\\")
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate the EQUATIONS.md reference from the registry.
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(r#"# Tankdip Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

Formulas used to convert a dip reading in a horizontal cylindrical tank into a
liquid volume. Lengths are in millimeters inside the calculation; volumes are
reported in liters.

---

"#);

    for category in Equation::all_categories() {
        let equations = Equation::in_category(category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.symbol.replace('"', ""),
                        var.description,
                        var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }
        }
    }

    output
}
