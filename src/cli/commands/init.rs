//! `orderdesk init` command - create the database

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::database_path;
use crate::cli::GlobalOpts;
use crate::core::{EntityKind, EntityRepository};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Replace the contents with the sample dataset
    #[arg(long)]
    pub seed: bool,

    /// Drop existing tables first
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = database_path(global);
    let existed = path.exists();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }

    let mut repo = EntityRepository::open(&path)?;
    if args.force {
        repo.reset_schema()?;
    }
    if args.seed {
        repo.seed_sample_data()?;
    }

    if global.quiet {
        return Ok(());
    }

    let verb = match (existed, args.force) {
        (false, _) => "Created",
        (true, true) => "Reset",
        (true, false) => "Opened",
    };
    println!(
        "{} {} database at {}",
        style("✓").green(),
        verb,
        style(path.display()).cyan()
    );
    if args.seed {
        let counts: Vec<String> = EntityKind::ALL
            .iter()
            .map(|e| Ok(format!("{} {}", repo.count(*e)?, e.table())))
            .collect::<Result<_, crate::core::RepositoryError>>()?;
        println!("  Loaded sample data: {}", counts.join(", "));
    }
    Ok(())
}
