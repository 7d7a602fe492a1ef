//! CSV export and import
//!
//! Export writes a header of column names followed by every row. Import
//! maps columns by header name and adds each row through
//! [`EntityRepository::insert`], so imported rows get new ids and pass the
//! same validation as any other insert.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::model::{Attribute, EntityKind};
use crate::core::repository::{EntityRepository, RepositoryError};

#[derive(Debug, Error, Diagnostic)]
pub enum TransferError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(orderdesk::transfer::csv))]
    Csv(#[from] csv::Error),

    #[error("missing column '{column}' for {entity}")]
    #[diagnostic(
        code(orderdesk::transfer::missing_column),
        help("the header row must name every column except id")
    )]
    MissingColumn { entity: EntityKind, column: String },

    #[error("row {row}: {source}")]
    #[diagnostic(code(orderdesk::transfer::row))]
    Row {
        row: usize,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),

    #[error("I/O error: {0}")]
    #[diagnostic(code(orderdesk::transfer::io))]
    Io(#[from] std::io::Error),
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based line number in the file, counting the header
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub created: Vec<i64>,
    pub failures: Vec<RowFailure>,
}

/// Write every row of an entity as CSV. Returns the number of rows written.
pub fn export_csv<W: Write>(
    repo: &EntityRepository,
    entity: EntityKind,
    writer: W,
) -> Result<usize, TransferError> {
    let records = repo.fetch_all(entity)?;
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(entity.attributes().iter().map(|a| a.column()))?;
    for record in &records {
        wtr.write_record(record.values.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    tracing::info!(entity = %entity, rows = records.len(), "exported CSV");
    Ok(records.len())
}

/// Insert every row of a CSV document.
///
/// Rows that fail validation are recorded in the returned stats and skipped,
/// unless `stop_on_error` is set, in which case the first failure is
/// returned. Rows inserted before a failure stay inserted.
pub fn import_csv<R: Read>(
    repo: &mut EntityRepository,
    entity: EntityKind,
    reader: R,
    stop_on_error: bool,
) -> Result<ImportStats, TransferError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let positions = column_positions(entity, &headers)?;

    let mut stats = ImportStats::default();
    for (index, result) in rdr.records().enumerate() {
        let row = index + 2;
        stats.rows_processed += 1;

        let outcome = result
            .map_err(|e| RepositoryError::validation(format!("malformed CSV row: {}", e)))
            .and_then(|record| {
                let values: Vec<String> = positions
                    .iter()
                    .map(|&i| record.get(i).unwrap_or_default().to_string())
                    .collect();
                repo.insert(entity, &values)
            });

        match outcome {
            Ok(id) => stats.created.push(id),
            Err(source) if stop_on_error => return Err(TransferError::Row { row, source }),
            Err(e) => {
                tracing::warn!(row, error = %e, "skipping CSV row");
                stats.failures.push(RowFailure {
                    row,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        entity = %entity,
        created = stats.created.len(),
        failed = stats.failures.len(),
        "imported CSV"
    );
    Ok(stats)
}

/// Header index of each data attribute, in insert order
fn column_positions(entity: EntityKind, headers: &StringRecord) -> Result<Vec<usize>, TransferError> {
    let resolved: Vec<Option<Attribute>> = headers
        .iter()
        .map(|h| Attribute::parse(entity, h))
        .collect();

    for (header, attribute) in headers.iter().zip(&resolved) {
        if attribute.is_none() {
            tracing::warn!(entity = %entity, column = header, "ignoring unknown column");
        }
    }

    entity
        .data_attributes()
        .iter()
        .map(|attribute| {
            resolved
                .iter()
                .position(|r| *r == Some(*attribute))
                .ok_or_else(|| TransferError::MissingColumn {
                    entity,
                    column: attribute.column().to_string(),
                })
        })
        .collect()
}
