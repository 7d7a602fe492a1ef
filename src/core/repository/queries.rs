//! Read-side queries

use rusqlite::{params, OptionalExtension, Row};

use super::{EntityRepository, RepositoryError, Result};
use crate::core::catalogue::{ColumnStats, FieldCatalogue};
use crate::core::model::{Attribute, EntityKind, OrderAttr};
use crate::core::predicate::{Predicate, PredicateScope, QueryTarget};
use crate::core::value::{Record, Value};

/// Qualified column list of an entity, in declaration order
pub(crate) fn select_list(entity: EntityKind) -> String {
    entity
        .attributes()
        .iter()
        .map(|a| a.qualified())
        .collect::<Vec<_>>()
        .join(", ")
}

fn record_from_row(entity: EntityKind, row: &Row<'_>) -> rusqlite::Result<Record> {
    let values = (0..entity.attributes().len())
        .map(|i| row.get::<_, Value>(i))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Record { entity, values })
}

impl EntityRepository {
    /// All rows of an entity, ordered by id
    pub fn fetch_all(&self, entity: EntityKind) -> Result<Vec<Record>> {
        self.query_records(entity, &Predicate::always(&entity))
    }

    /// Rows of an entity matching a predicate compiled for that entity
    pub fn fetch_filtered(&self, entity: EntityKind, predicate: &Predicate) -> Result<Vec<Record>> {
        if predicate.scope() != PredicateScope::Entity(entity) {
            return Err(RepositoryError::validation(format!(
                "predicate was not compiled for {}",
                entity
            )));
        }
        self.query_records(entity, predicate)
    }

    fn query_records(&self, entity: EntityKind, predicate: &Predicate) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            select_list(entity),
            entity.table(),
            predicate.sql(),
            entity.primary_key().qualified()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(predicate.params().as_slice(), |row| {
            record_from_row(entity, row)
        })?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(entity = %entity, rows = records.len(), "fetched records");
        Ok(records)
    }

    /// A single row by id
    pub fn fetch_one(&self, entity: EntityKind, id: i64) -> Result<Record> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            select_list(entity),
            entity.table(),
            entity.primary_key().qualified()
        );
        self.conn
            .query_row(&sql, params![id], |row| record_from_row(entity, row))
            .optional()?
            .ok_or(RepositoryError::NotFound { entity, id })
    }

    pub fn exists(&self, entity: EntityKind, id: i64) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", entity.table());
        Ok(self
            .conn
            .query_row(&sql, params![id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    pub fn count(&self, entity: EntityKind) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", entity.table());
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Filter options for a target, from the rows currently stored
    pub fn field_catalogue<T: QueryTarget>(&self, target: &T) -> Result<FieldCatalogue<T::Field>> {
        FieldCatalogue::build(target, self)
    }

    /// Ids of the orders referencing a product
    pub(crate) fn order_ids_for_product(&self, product_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM orders WHERE product_id = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![product_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// The product an order references, `None` if the reference is empty
    pub(crate) fn product_of_order(&self, order_id: i64) -> Result<Option<i64>> {
        let record = self.fetch_one(EntityKind::Order, order_id)?;
        Ok(record
            .get(Attribute::Order(OrderAttr::ProductId))
            .and_then(Value::as_i64))
    }
}

impl ColumnStats for EntityRepository {
    type Error = RepositoryError;

    fn distinct_values(&self, attribute: Attribute) -> Result<Vec<String>> {
        let column = attribute.qualified();
        let sql = format!(
            "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL ORDER BY {col}",
            col = column,
            table = attribute.entity().table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .map(|v| v.map(|v| v.to_string()))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    fn value_range(&self, attribute: Attribute) -> Result<Option<(f64, f64)>> {
        let sql = format!(
            "SELECT MIN({col}), MAX({col}) FROM {table}",
            col = attribute.qualified(),
            table = attribute.entity().table()
        );
        let (min, max): (Option<f64>, Option<f64>) = self
            .conn
            .query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(min.zip(max))
    }
}
