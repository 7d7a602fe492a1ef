//! Write-side operations: insert, update, delete

use rusqlite::params_from_iter;

use super::{EntityRepository, RepositoryError, Result, UpdateOutcome};
use crate::core::model::{normalize_name, Attribute, EntityKind, OrderAttr, ProductAttr, ValueKind};
use crate::core::notify::{ChangeKind, RecordChanged};
use crate::core::propagation::Propagation;
use crate::core::value::Value;

impl EntityRepository {
    /// Add a row from positional values, one per non-key attribute in
    /// declaration order. Returns the assigned id.
    pub fn insert(&mut self, entity: EntityKind, values: &[String]) -> Result<i64> {
        let attributes = entity.data_attributes();
        if values.len() != attributes.len() {
            let expected: Vec<_> = attributes.iter().map(|a| a.column()).collect();
            return Err(RepositoryError::validation(format!(
                "{} takes {} values ({}), got {}",
                entity,
                attributes.len(),
                expected.join(", "),
                values.len()
            )));
        }

        let mut parsed = Vec::with_capacity(values.len());
        for (attribute, raw) in attributes.iter().zip(values) {
            let value = parse_for(*attribute, raw)?;
            self.check_rules(*attribute, &value)?;
            parsed.push(value);
        }

        let columns: Vec<_> = attributes.iter().map(|a| a.column()).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            entity.table(),
            columns.join(", "),
            placeholders
        );
        self.conn.execute(&sql, params_from_iter(parsed.iter()))?;
        let id = self.conn.last_insert_rowid();

        tracing::info!(entity = %entity, id, "inserted record");
        self.publish(RecordChanged {
            entity,
            id,
            attribute: None,
            kind: ChangeKind::Inserted,
        });
        Ok(id)
    }

    /// Overwrite one attribute of one row, naming the attribute by column or
    /// label. The id can never be changed.
    pub fn update(
        &mut self,
        entity: EntityKind,
        id: i64,
        attribute_name: &str,
        raw: &str,
    ) -> Result<UpdateOutcome> {
        if normalize_name(attribute_name) == entity.primary_key().column() {
            return Err(RepositoryError::PrimaryKeyImmutable { entity });
        }
        let attribute = Attribute::parse(entity, attribute_name).ok_or_else(|| {
            RepositoryError::validation(format!(
                "{} has no attribute '{}'",
                entity, attribute_name
            ))
        })?;
        let value = parse_for(attribute, raw)?;
        self.update_attribute(attribute, id, value)
    }

    /// Typed form of [`update`](Self::update).
    ///
    /// After the write is committed, its counterpart writes are applied. If
    /// one of those fails, the error is returned but the original write
    /// stays in place.
    pub fn update_attribute(
        &mut self,
        attribute: Attribute,
        id: i64,
        value: Value,
    ) -> Result<UpdateOutcome> {
        if attribute.is_primary_key() {
            return Err(RepositoryError::PrimaryKeyImmutable {
                entity: attribute.entity(),
            });
        }
        let value = conform(attribute, value)?;
        self.write_attribute(attribute, id, &value, ChangeKind::Updated)?;

        let propagated = match Propagation::for_change(attribute, id, &value) {
            Some(plan) => self.propagate(plan)?,
            None => Vec::new(),
        };

        Ok(UpdateOutcome {
            attribute,
            id,
            value,
            propagated,
        })
    }

    /// Validate and store a single attribute, then announce it.
    /// Never propagates.
    pub(crate) fn write_attribute(
        &mut self,
        attribute: Attribute,
        id: i64,
        value: &Value,
        kind: ChangeKind,
    ) -> Result<()> {
        self.check_rules(attribute, value)?;
        let entity = attribute.entity();
        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
            entity.table(),
            attribute.column(),
            entity.primary_key().column()
        );
        let changed = self.conn.execute(&sql, rusqlite::params![value, id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound { entity, id });
        }

        tracing::info!(attribute = %attribute, id, value = %value, ?kind, "updated record");
        self.publish(RecordChanged {
            entity,
            id,
            attribute: Some(attribute),
            kind,
        });
        Ok(())
    }

    /// Remove a row. References to it from other rows are left as they are.
    pub fn delete(&mut self, entity: EntityKind, id: i64) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            entity.table(),
            entity.primary_key().column()
        );
        let changed = self.conn.execute(&sql, [id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound { entity, id });
        }

        tracing::info!(entity = %entity, id, "deleted record");
        self.publish(RecordChanged {
            entity,
            id,
            attribute: None,
            kind: ChangeKind::Deleted,
        });
        Ok(())
    }

    /// Domain rules checked on every write, direct or propagated
    fn check_rules(&self, attribute: Attribute, value: &Value) -> Result<()> {
        match attribute {
            Attribute::Product(ProductAttr::Price) | Attribute::Product(ProductAttr::Stock) => {
                if value.as_f64().is_some_and(|v| v < 0.0) {
                    return Err(RepositoryError::validation(format!(
                        "{} cannot be negative (got {})",
                        attribute.label().to_lowercase(),
                        value
                    )));
                }
            }
            Attribute::Order(OrderAttr::CustomerId) => {
                self.check_reference(EntityKind::Customer, value)?;
            }
            Attribute::Order(OrderAttr::ProductId) => {
                self.check_reference(EntityKind::Product, value)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn check_reference(&self, target: EntityKind, value: &Value) -> Result<()> {
        let id = value.as_i64().ok_or_else(|| {
            RepositoryError::validation(format!("{} id must be an integer", target))
        })?;
        if !self.exists(target, id)? {
            return Err(RepositoryError::validation(format!(
                "{} {} does not exist",
                target, id
            )));
        }
        Ok(())
    }
}

fn parse_for(attribute: Attribute, raw: &str) -> Result<Value> {
    Value::parse(attribute.kind(), raw).map_err(|e| {
        RepositoryError::validation(format!("invalid {}: {}", attribute.label().to_lowercase(), e))
    })
}

/// Coerce a typed value to the attribute's value kind
fn conform(attribute: Attribute, value: Value) -> Result<Value> {
    match (attribute.kind(), value) {
        (ValueKind::Text, v @ Value::Text(_)) => Ok(v),
        (ValueKind::Date, Value::Text(s)) => parse_for(attribute, &s),
        (ValueKind::Integer, v @ Value::Integer(_)) => Ok(v),
        (ValueKind::Real, Value::Integer(i)) => Ok(Value::Real(i as f64)),
        (ValueKind::Real, Value::Real(f)) if f.is_finite() => Ok(Value::Real(f)),
        (kind, v) => Err(RepositoryError::validation(format!(
            "{} expects a {}, got '{}'",
            attribute, kind, v
        ))),
    }
}
