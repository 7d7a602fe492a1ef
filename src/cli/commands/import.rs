//! `orderdesk import` command - add records from a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::{open_repository, parse_entity};
use crate::cli::GlobalOpts;
use crate::core::{import_csv, EntityKind};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Entity to import (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// CSV file with a header row; an id column is ignored
    pub file: PathBuf,

    /// Stop at the first invalid row (default: skip it and continue)
    #[arg(long)]
    pub stop_on_error: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let file = File::open(&args.file).into_diagnostic()?;
    let stats = import_csv(
        &mut repo,
        args.entity,
        BufReader::new(file),
        args.stop_on_error,
    )?;

    for failure in &stats.failures {
        eprintln!(
            "{} Row {}: {}",
            style("✗").red(),
            failure.row,
            failure.message
        );
    }

    if !global.quiet {
        println!();
        println!("{}", style("Import Summary").bold());
        println!("{}", style("─".repeat(30)).dim());
        println!("  Rows processed: {}", stats.rows_processed);
        println!(
            "  Records added:  {}",
            style(stats.created.len()).green()
        );
        if !stats.failures.is_empty() {
            println!("  Errors:         {}", style(stats.failures.len()).red());
        }
    }
    Ok(())
}
