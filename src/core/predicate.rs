//! Predicate compilation
//!
//! Turns a free-text search term and a [`FilterState`] into a single
//! parameterized SQL condition. Every column reference is table-qualified
//! and every user-supplied value travels as a bound parameter, so the
//! generated SQL only ever contains names from the static attribute tables.

use rusqlite::ToSql;

use crate::core::filter::{FieldFilter, FilterError, FilterKey, FilterState};
use crate::core::model::{CustomerOrderView, EntityKind, ViewField};
use crate::core::value::Value;

/// Name of the SQL scalar function used for case-insensitive search
pub const FOLD_CONTAINS: &str = "fold_contains";

/// What a predicate was compiled against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateScope {
    /// A single entity table
    Entity(EntityKind),
    /// The customers/orders/products join
    CustomerOrders,
}

/// Something a search and filter state can be compiled for
pub trait QueryTarget {
    /// Field vocabulary of this target
    type Field: FilterKey;

    fn name(&self) -> &'static str;

    fn scope(&self) -> PredicateScope;

    /// Filterable fields in declaration order
    fn filter_fields(&self) -> Vec<Self::Field>;

    /// SQL condition for the free-text search, with a single `?` placeholder
    fn search_clause(&self) -> Option<String>;

    /// Whether a field belongs to this target's vocabulary
    fn owns(&self, field: Self::Field) -> bool;
}

impl QueryTarget for EntityKind {
    type Field = crate::core::model::Attribute;

    fn name(&self) -> &'static str {
        self.label()
    }

    fn scope(&self) -> PredicateScope {
        PredicateScope::Entity(*self)
    }

    fn filter_fields(&self) -> Vec<Self::Field> {
        self.attributes()
            .iter()
            .copied()
            .filter(|a| a.filter_kind().is_some())
            .collect()
    }

    fn search_clause(&self) -> Option<String> {
        let attr = self.search_attribute()?;
        let contains = format!("{}({}, ?)", FOLD_CONTAINS, attr.qualified());
        if attr.entity() == *self {
            return Some(contains);
        }
        // Searching another entity's column goes through this entity's
        // foreign key, e.g. orders are found by their customer's name.
        let foreign = attr.entity();
        let fk = self
            .attributes()
            .iter()
            .find(|a| a.column() == format!("{}_id", foreign.label().to_lowercase()))?;
        Some(format!(
            "{} IN (SELECT {} FROM {} WHERE {})",
            fk.qualified(),
            foreign.primary_key().qualified(),
            foreign.table(),
            contains
        ))
    }

    fn owns(&self, field: Self::Field) -> bool {
        field.entity() == *self
    }
}

impl QueryTarget for CustomerOrderView {
    type Field = ViewField;

    fn name(&self) -> &'static str {
        "Customer Orders"
    }

    fn scope(&self) -> PredicateScope {
        PredicateScope::CustomerOrders
    }

    fn filter_fields(&self) -> Vec<Self::Field> {
        ViewField::ALL
            .iter()
            .copied()
            .filter(|f| f.filter_kind().is_some())
            .collect()
    }

    fn search_clause(&self) -> Option<String> {
        Some(format!(
            "{}({}, ?)",
            FOLD_CONTAINS,
            ViewField::CustomerName.source().qualified()
        ))
    }

    fn owns(&self, _field: Self::Field) -> bool {
        true
    }
}

/// One condition with its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A compiled condition, ready to append after `WHERE`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    scope: PredicateScope,
    fragments: Vec<Fragment>,
}

impl Predicate {
    /// A predicate matching every row of the target
    pub fn always<T: QueryTarget>(target: &T) -> Self {
        Self {
            scope: target.scope(),
            fragments: Vec::new(),
        }
    }

    pub fn scope(&self) -> PredicateScope {
        self.scope
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// SQL condition text; `1=1` when nothing restricts the rows
    pub fn sql(&self) -> String {
        if self.fragments.is_empty() {
            return "1=1".to_string();
        }
        self.fragments
            .iter()
            .map(|f| f.sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Arguments in placeholder order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fragments.iter().flat_map(|f| f.params.iter())
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.values().map(|v| v as &dyn ToSql).collect()
    }
}

/// Compile a search term and filter state for a target.
///
/// The search fragment comes first, followed by one fragment per enabled
/// filter in field declaration order.
pub fn compile<T: QueryTarget>(
    target: &T,
    search: &str,
    filters: &FilterState<T::Field>,
) -> Result<Predicate, FilterError> {
    let mut fragments = Vec::new();

    if !search.is_empty() {
        if let Some(sql) = target.search_clause() {
            fragments.push(Fragment {
                sql,
                params: vec![Value::Text(search.to_string())],
            });
        }
    }

    for (field, filter) in filters.iter() {
        if !target.owns(field) {
            return Err(FilterError::ForeignField {
                field: field.label().to_string(),
                target: target.name().to_string(),
            });
        }
        if !filter.is_enabled() {
            continue;
        }
        let expected = field.filter_kind().ok_or_else(|| FilterError::NotFilterable {
            field: field.label().to_string(),
        })?;
        if filter.kind() != Some(expected) {
            return Err(FilterError::ShapeMismatch {
                field: field.label().to_string(),
                expected,
            });
        }
        if let Some(fragment) = compile_field(field, filter)? {
            fragments.push(fragment);
        }
    }

    let predicate = Predicate {
        scope: target.scope(),
        fragments,
    };
    tracing::debug!(
        target_name = target.name(),
        sql = %predicate.sql(),
        args = predicate.values().count(),
        "compiled predicate"
    );
    Ok(predicate)
}

fn compile_field<K: FilterKey>(
    field: K,
    filter: &FieldFilter,
) -> Result<Option<Fragment>, FilterError> {
    let source = field.source();
    let column = source.qualified();
    match filter {
        FieldFilter::Disabled => Ok(None),
        FieldFilter::Categorical { values } => {
            if values.is_empty() {
                return Ok(None);
            }
            let params = values
                .iter()
                .map(|raw| {
                    Value::parse(source.kind(), raw).map_err(|source| FilterError::InvalidValue {
                        field: field.label().to_string(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let placeholders = vec!["?"; params.len()].join(", ");
            Ok(Some(Fragment {
                sql: format!("{} IN ({})", column, placeholders),
                params,
            }))
        }
        FieldFilter::Range { min, max } => {
            let fragment = match (min, max) {
                (None, None) => return Ok(None),
                (Some(lo), None) => Fragment {
                    sql: format!("{} >= ?", column),
                    params: vec![Value::Real(*lo)],
                },
                (None, Some(hi)) => Fragment {
                    sql: format!("{} <= ?", column),
                    params: vec![Value::Real(*hi)],
                },
                (Some(lo), Some(hi)) => Fragment {
                    sql: format!("{} BETWEEN ? AND ?", column),
                    params: vec![Value::Real(*lo), Value::Real(*hi)],
                },
            };
            Ok(Some(fragment))
        }
    }
}
