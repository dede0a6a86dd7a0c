//! Writes the equation reference (EQUATIONS.md) from the registry.
//!
//! ```bash
//! cargo run --bin gen-equations                  # dip_core/src/equations/EQUATIONS.md
//! cargo run --bin gen-equations -- docs/eq.md    # somewhere else
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use dip_core::equations::{generate_equations_markdown, ALL_EQUATIONS};

const DEFAULT_OUTPUT: &str = "dip_core/src/equations/EQUATIONS.md";

fn main() -> ExitCode {
    let target = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let markdown = generate_equations_markdown();
    if let Err(e) = fs::write(&target, &markdown) {
        eprintln!("cannot write {}: {}", target.display(), e);
        return ExitCode::FAILURE;
    }

    println!("{} equations -> {}", ALL_EQUATIONS.len(), target.display());
    ExitCode::SUCCESS
}
