//! `orderdesk view` command - the customer orders view

use clap::Subcommand;
use miette::{bail, Result};

use crate::cli::commands::edit::report;
use crate::cli::helpers::{effective_format, open_repository, parse_range_filter, view_filters, RangeFilter};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{compile, CustomerOrderRow, CustomerOrderView, ViewField};

#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// List customers with their orders and products
    List(ViewListArgs),

    /// Edit Order Amount or Product Price through the view
    Edit(ViewEditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ViewListArgs {
    /// Case-insensitive search in customer names
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Inclusive range on "Order Amount" or "Product Price",
    /// e.g. --range "Order Amount=100..500"
    #[arg(long = "range", value_name = "FIELD=MIN..MAX", value_parser = parse_range_filter)]
    pub range_filters: Vec<RangeFilter>,

    /// Show at most N rows
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Only print the number of matching rows
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ViewEditArgs {
    /// Order id of the row
    pub order_id: i64,

    /// Column to edit ("Order Amount" or "Product Price")
    pub field: String,

    /// New value
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

pub fn run(cmd: ViewCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ViewCommands::List(args) => run_list(args, global),
        ViewCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ViewListArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let filters = view_filters(&args.range_filters)?;
    let predicate = compile(
        &CustomerOrderView,
        args.search.as_deref().unwrap_or(""),
        &filters,
    )?;
    let mut rows = repo.project_filtered(&predicate)?;
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    let columns: Vec<ColumnDef> = ViewField::ALL
        .iter()
        .map(|f| {
            let key = f.label().to_lowercase().replace(' ', "_");
            let width = match f {
                ViewField::CustomerName | ViewField::ProductName => 28,
                _ => 12,
            };
            ColumnDef::new(key, f.label(), width)
        })
        .collect();
    let table: Vec<TableRow> = rows.iter().map(view_row).collect();

    let format = effective_format(global);
    let config = if global.quiet || format != OutputFormat::Tsv {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    TableFormatter::new(&columns, "order")
        .with_config(config)
        .output(&table, format)
}

fn view_row(row: &CustomerOrderRow) -> TableRow {
    TableRow::new(row.order_id.to_string())
        .cell(CellValue::Id(row.customer_id))
        .cell(CellValue::Text(row.customer_name.clone()))
        .cell(CellValue::Text(row.order_date.clone()))
        .cell(CellValue::Real(row.order_amount))
        .cell(CellValue::Text(row.product_name.clone()))
        .cell(CellValue::Real(row.product_price))
}

fn run_edit(args: ViewEditArgs, global: &GlobalOpts) -> Result<()> {
    let Some(field) = ViewField::parse(&args.field) else {
        bail!(
            help = "view columns: Customer ID, Customer Name, Order Date, Order Amount, Product Name, Product Price",
            "unknown view column '{}'",
            args.field
        );
    };
    let mut repo = open_repository(global)?;
    let outcome = repo.apply_view_edit(args.order_id, field, &args.value)?;
    if !global.quiet {
        report(&outcome);
    }
    Ok(())
}
