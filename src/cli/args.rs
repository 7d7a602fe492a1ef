//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs, completions::CompletionsArgs, delete::DeleteArgs, edit::EditArgs,
    export::ExportArgs, fields::FieldsArgs, import::ImportArgs, init::InitArgs, list::ListArgs,
    view::ViewCommands,
};

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(author, version, about = "Browse, filter and edit customers, orders, products and suppliers")]
#[command(long_about = "A command-line front end over a small SQLite order database. \
Product prices and order amounts are kept consistent on every edit.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file (default: from config, or ./orderdesk.db)
    #[arg(long, global = true, env = "ORDERDESK_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database tables, optionally with sample data
    Init(InitArgs),

    /// List records of an entity, with search and filters
    List(ListArgs),

    /// Show the filterable fields of an entity or the view, with their options
    Fields(FieldsArgs),

    /// Add a record
    Add(AddArgs),

    /// Change one attribute of a record
    Edit(EditArgs),

    /// Delete records
    Delete(DeleteArgs),

    /// Customer orders view (customers joined with their orders and products)
    #[command(subcommand)]
    View(ViewCommands),

    /// Export an entity as CSV
    Export(ExportArgs),

    /// Import records from a CSV file
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default (tsv if none)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Aligned columns (for reading)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
