//! `orderdesk list` command - list records with search, filters and sorting

use miette::{bail, Result};
use std::cmp::Ordering;

use crate::cli::helpers::{
    effective_format, entity_filters, open_repository, parse_entity, parse_in_filter,
    parse_range_filter, InFilter, RangeFilter,
};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{compile, Attribute, EntityKind, Record, Value, ValueKind};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Entity to list (customer, order, product, supplier)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Case-insensitive search in names (orders: the customer's name)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Keep rows whose FIELD is one of the values, e.g. --in city=Kraków,Poznań
    #[arg(long = "in", value_name = "FIELD=V1,V2", value_parser = parse_in_filter)]
    pub in_filters: Vec<InFilter>,

    /// Keep rows whose FIELD lies in an inclusive range, e.g. --range price=100..500
    #[arg(long = "range", value_name = "FIELD=MIN..MAX", value_parser = parse_range_filter)]
    pub range_filters: Vec<RangeFilter>,

    /// Sort by field (default: id)
    #[arg(long)]
    pub sort: Option<String>,

    /// Reverse the sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Show at most N rows
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Only print the number of matching rows
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let entity = args.entity;

    let filters = entity_filters(entity, &args.in_filters, &args.range_filters)?;
    let predicate = compile(&entity, args.search.as_deref().unwrap_or(""), &filters)?;
    let mut records = repo.fetch_filtered(entity, &predicate)?;

    if let Some(ref name) = args.sort {
        let Some(attribute) = Attribute::parse(entity, name) else {
            bail!("{} has no field '{}'", entity, name);
        };
        sort_records(&mut records, attribute);
    }
    if args.reverse {
        records.reverse();
    }
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    let columns = record_columns(entity);
    let rows: Vec<TableRow> = records.iter().map(record_row).collect();
    let format = effective_format(global);
    let config = if global.quiet || format != OutputFormat::Tsv {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    TableFormatter::new(&columns, entity.label())
        .with_config(config)
        .output(&rows, format)
}

/// Table columns for an entity, id first
pub fn record_columns(entity: EntityKind) -> Vec<ColumnDef> {
    entity
        .attributes()
        .iter()
        .map(|a| {
            let width = match a.kind() {
                _ if a.is_primary_key() => 6,
                ValueKind::Text => 32,
                ValueKind::Integer => 12,
                ValueKind::Real => 12,
                ValueKind::Date => 10,
            };
            ColumnDef::new(a.column(), a.label(), width)
        })
        .collect()
}

pub fn record_row(record: &Record) -> TableRow {
    let id = record.id();
    let mut row = TableRow::new(id.to_string()).cell(CellValue::Id(id));
    for value in record.values.iter().skip(1) {
        row = row.cell(CellValue::from(value));
    }
    row
}

/// Stable sort by one attribute; numbers compare numerically, text ignoring case
fn sort_records(records: &mut [Record], attribute: Attribute) {
    records.sort_by(|a, b| compare_values(a.get(attribute), b.get(attribute)));
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
        },
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
