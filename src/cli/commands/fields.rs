//! `orderdesk fields` command - show the filter options of an entity or the view

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{effective_format, open_repository};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CustomerOrderView, EntityKind, FieldCatalogue, FieldSpec, FilterKey};

#[derive(clap::Args, Debug)]
pub struct FieldsArgs {
    /// Entity name, or `view` for the customer orders view
    pub target: String,
}

#[derive(Serialize)]
struct FieldEntry {
    field: String,
    #[serde(flatten)]
    spec: FieldSpec,
}

pub fn run(args: FieldsArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;

    let entries = if is_view(&args.target) {
        entries(&repo.field_catalogue(&CustomerOrderView)?)
    } else {
        let entity: EntityKind = args.target.parse().map_err(|e: String| miette::miette!("{}", e))?;
        entries(&repo.field_catalogue(&entity)?)
    };

    match effective_format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
        }
        format => {
            let columns = [
                ColumnDef::new("field", "Field", 16),
                ColumnDef::new("kind", "Kind", 12),
                ColumnDef::new("options", "Options", 60),
            ];
            let rows: Vec<TableRow> = entries
                .iter()
                .map(|e| {
                    TableRow::new(e.field.clone())
                        .cell(CellValue::Text(e.field.clone()))
                        .cell(CellValue::Text(e.spec.kind().to_string()))
                        .cell(CellValue::Text(describe(&e.spec)))
                })
                .collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(&columns, "field")
                .with_config(config)
                .output(&rows, format)?;
        }
    }
    Ok(())
}

fn is_view(target: &str) -> bool {
    matches!(
        target.trim().to_lowercase().as_str(),
        "view" | "customer-orders" | "customer_orders"
    )
}

fn entries<K: FilterKey>(catalogue: &FieldCatalogue<K>) -> Vec<FieldEntry> {
    catalogue
        .entries()
        .iter()
        .map(|(field, spec)| FieldEntry {
            field: field.label().to_string(),
            spec: spec.clone(),
        })
        .collect()
}

fn describe(spec: &FieldSpec) -> String {
    match spec {
        FieldSpec::Categorical { options } => options.join(", "),
        FieldSpec::Range { min, max } => format!("{}..{}", min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&FieldSpec::Range {
                min: 399.99,
                max: 4999.99
            }),
            "399.99..4999.99"
        );
        assert_eq!(
            describe(&FieldSpec::Categorical {
                options: vec!["Biuro".into(), "Elektronika".into()]
            }),
            "Biuro, Elektronika"
        );
        assert!(is_view("View"));
        assert!(!is_view("orders"));
    }
}
