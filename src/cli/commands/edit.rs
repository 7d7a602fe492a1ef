//! `orderdesk edit` command - change one attribute of a record

use console::style;
use miette::Result;

use crate::cli::helpers::{open_repository, parse_entity};
use crate::cli::GlobalOpts;
use crate::core::{EntityKind, UpdateOutcome};

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Entity of the record (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Record id
    pub id: i64,

    /// Attribute to change, by column name or label
    pub attribute: String,

    /// New value
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let outcome = repo.update(args.entity, args.id, &args.attribute, &args.value)?;
    if !global.quiet {
        report(&outcome);
    }
    Ok(())
}

/// Print an update and the rows it propagated to
pub fn report(outcome: &UpdateOutcome) {
    println!(
        "{} Set {} of {} {} to {}",
        style("✓").green(),
        style(outcome.attribute.column()).bold(),
        outcome.attribute.entity(),
        style(outcome.id).cyan(),
        style(&outcome.value).yellow()
    );
    for record in &outcome.propagated {
        println!(
            "  {} also updated {} {}",
            style("→").dim(),
            record.entity,
            style(record.id).cyan()
        );
    }
}
