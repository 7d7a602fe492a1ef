//! `orderdesk delete` command - remove records

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_repository, parse_entity};
use crate::cli::GlobalOpts;
use crate::core::EntityKind;

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Entity of the records (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<i64>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;

    // Fail on unknown ids before asking anything
    for id in &args.ids {
        repo.fetch_one(args.entity, *id)?;
    }

    if !args.yes {
        let prompt = format!(
            "Delete {} {}(s) {}?",
            args.ids.len(),
            args.entity.label().to_lowercase(),
            args.ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    for id in &args.ids {
        repo.delete(args.entity, *id)?;
        if !global.quiet {
            println!(
                "{} Deleted {} {}",
                style("✓").green(),
                args.entity,
                style(id).cyan()
            );
        }
    }
    Ok(())
}
