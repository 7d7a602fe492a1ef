//! `orderdesk add` command - insert a record

use console::style;
use miette::Result;

use crate::cli::helpers::{effective_format, open_repository, parse_entity};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::EntityKind;

#[derive(clap::Args, Debug)]
#[command(after_help = "Values are positional, in column order without the id:\n  \
customer: name email phone city\n  \
order:    customer_id product_id date amount status\n  \
product:  name category price stock\n  \
supplier: name contact address email")]
pub struct AddArgs {
    /// Entity to add (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Attribute values in column order
    #[arg(num_args = 1.., allow_hyphen_values = true)]
    pub values: Vec<String>,
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let id = repo.insert(args.entity, &args.values)?;

    if global.quiet || effective_format(global) == OutputFormat::Id {
        println!("{}", id);
    } else {
        println!(
            "{} Added {} {}",
            style("✓").green(),
            args.entity,
            style(id).cyan()
        );
    }
    Ok(())
}
