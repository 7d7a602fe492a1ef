//! `orderdesk export` command - write an entity as CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::cli::helpers::{open_repository, parse_entity};
use crate::cli::GlobalOpts;
use crate::core::{export_csv, EntityKind};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Entity to export (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let rows = export_csv(&repo, args.entity, BufWriter::new(file))?;
            if !global.quiet {
                eprintln!(
                    "{} Exported {} {}(s) to {}",
                    style("✓").green(),
                    rows,
                    args.entity.label().to_lowercase(),
                    style(path.display()).cyan()
                );
            }
        }
        None => {
            export_csv(&repo, args.entity, io::stdout().lock())?;
        }
    }
    Ok(())
}
