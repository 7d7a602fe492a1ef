//! Table formatting utilities for CLI list commands
//!
//! One formatter for every listing: entity records, the customer orders
//! view and field catalogues all go through [`TableFormatter`], which
//! renders aligned columns, CSV, Markdown (via `tabled`), JSON, YAML or
//! bare ids.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value as JsonValue};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::Value;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 product(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Record id (cyan in terminal output)
    Id(i64),
    Text(String),
    Integer(i64),
    Real(f64),
    Empty,
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Integer(i) => CellValue::Integer(*i),
            Value::Real(f) => CellValue::Real(*f),
            Value::Text(s) => CellValue::Text(s.clone()),
        }
    }
}

impl CellValue {
    /// Format for aligned terminal output
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width);
                let pad = width.saturating_sub(truncated.chars().count());
                format!("{}{}", truncated, " ".repeat(pad))
            }
            CellValue::Integer(n) => format!("{:>width$}", n, width = width),
            CellValue::Real(f) => format!("{:>width$.2}", f, width = width),
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Text(s) => escape_csv(s),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (escaped pipes)
    pub fn format_md(&self) -> String {
        match self {
            CellValue::Empty => "-".to_string(),
            CellValue::Real(f) => format!("{:.2}", f),
            other => other.raw().replace('|', "\\|"),
        }
    }

    /// Unformatted value
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Real(f) => f.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Id(id) | CellValue::Integer(id) => JsonValue::from(*id),
            CellValue::Real(f) => JsonValue::from(*f),
            CellValue::Text(s) => JsonValue::from(s.as_str()),
            CellValue::Empty => JsonValue::Null,
        }
    }

    /// Width of the content in characters
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Real(f) => format!("{:.2}", f).len(),
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Machine name, used as the JSON/YAML key and CSV header
    pub key: String,
    pub header: String,
    pub width: usize,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, header: impl Into<String>, width: usize) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width,
        }
    }
}

/// A row of cell values, one per column
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Value printed by the `id` format
    pub id: String,
    pub cells: Vec<CellValue>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, value: CellValue) -> Self {
        self.cells.push(value);
        self
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'a str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'a str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&self.objects(rows)).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Yaml => {
                let yaml = serde_yml::to_string(&self.objects(rows)).into_diagnostic()?;
                print!("{}", yaml);
            }
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.id);
                }
            }
            OutputFormat::Tsv | OutputFormat::Auto => self.output_tsv(rows),
        }
        Ok(())
    }

    /// Rows as JSON objects keyed by column key
    fn objects(&self, rows: &[TableRow]) -> Vec<JsonValue> {
        rows.iter()
            .map(|row| {
                let map: Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(col, cell)| (col.key.clone(), cell.to_json()))
                    .collect();
                JsonValue::Object(map)
            })
            .collect()
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                col.header.chars().count().max(max_content).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| {
                let pad = w.saturating_sub(col.header.chars().count());
                format!("{}{}", style(&col.header).bold(), " ".repeat(pad))
            })
            .collect();
        println!("{}", header.join("  "));

        let total_width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| cell.format_tsv(*w))
                .collect();
            println!("{}", parts.join("  ").trim_end());
        }

        if self.config.show_summary {
            println!();
            println!(
                "{} {}(s) found.",
                style(rows.len()).cyan(),
                self.entity_name.to_lowercase()
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let header: Vec<String> = self.columns.iter().map(|c| escape_csv(&c.key)).collect();
        println!("{}", header.join(","));
        for row in rows {
            let cells: Vec<String> = row.cells.iter().map(CellValue::format_csv).collect();
            println!("{}", cells.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.clone()));
        for row in rows {
            builder.push_record(row.cells.iter().map(CellValue::format_md));
        }
        println!("{}", builder.build().with(Style::markdown()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_value() {
        assert_eq!(CellValue::from(&Value::Integer(3)), CellValue::Integer(3));
        assert_eq!(CellValue::from(&Value::Null), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Value::from("Biuro")),
            CellValue::Text("Biuro".into())
        );
    }

    #[test]
    fn test_formats() {
        let cell = CellValue::Text("ul. Cyfrowa 10, Kraków".into());
        assert_eq!(cell.format_csv(), "\"ul. Cyfrowa 10, Kraków\"");
        assert_eq!(CellValue::Real(399.99).format_md(), "399.99");
        assert_eq!(CellValue::Real(150.0).raw(), "150");
        assert_eq!(CellValue::Text("a|b".into()).format_md(), "a\\|b");
        assert_eq!(CellValue::Id(7).to_json(), serde_json::json!(7));
    }

    #[test]
    fn test_widths_follow_content_and_cap() {
        let columns = vec![
            ColumnDef::new("id", "ID", 6),
            ColumnDef::new("name", "Name", 8),
        ];
        let rows = vec![TableRow::new("1")
            .cell(CellValue::Id(1))
            .cell(CellValue::Text("Katarzyna Lewandowska".into()))];
        let formatter = TableFormatter::new(&columns, "Customer");
        assert_eq!(formatter.calculate_widths(&rows), vec![2, 8]);
    }

    #[test]
    fn test_objects_keyed_by_column() {
        let columns = vec![
            ColumnDef::new("id", "ID", 6),
            ColumnDef::new("price", "Price", 10),
        ];
        let rows = vec![TableRow::new("5")
            .cell(CellValue::Id(5))
            .cell(CellValue::Real(399.99))];
        let formatter = TableFormatter::new(&columns, "Product");
        assert_eq!(
            formatter.objects(&rows),
            vec![serde_json::json!({"id": 5, "price": 399.99})]
        );
    }
}
