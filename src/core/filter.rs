//! Filter state: per-field enabled/value configuration
//!
//! A [`FilterState`] is keyed by the field vocabulary of its query target
//! ([`Attribute`] for entities, [`ViewField`] for the customer order view).
//! Each entry is a [`FieldFilter`], so a field holds either a value list or
//! numeric bounds, never both.

use miette::Diagnostic;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::core::model::{Attribute, FilterKind, ViewField};
use crate::core::value::ParseValueError;

/// A field that can appear in a filter state
pub trait FilterKey: Copy + Ord + fmt::Debug {
    /// Entity attribute the field reads from
    fn source(&self) -> Attribute;

    /// Display label
    fn label(&self) -> &'static str;

    /// How the field can be filtered, if at all
    fn filter_kind(&self) -> Option<FilterKind>;
}

impl FilterKey for Attribute {
    fn source(&self) -> Attribute {
        *self
    }

    fn label(&self) -> &'static str {
        self.descriptor().label
    }

    fn filter_kind(&self) -> Option<FilterKind> {
        self.descriptor().filter
    }
}

impl FilterKey for ViewField {
    fn source(&self) -> Attribute {
        ViewField::source(self)
    }

    fn label(&self) -> &'static str {
        ViewField::label(self)
    }

    fn filter_kind(&self) -> Option<FilterKind> {
        ViewField::filter_kind(self)
    }
}

/// Filter configuration for one field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldFilter {
    #[default]
    Disabled,
    /// Match any of the listed values. An empty list matches everything.
    Categorical { values: Vec<String> },
    /// Inclusive bounds; a missing bound is unbounded on that side
    Range { min: Option<f64>, max: Option<f64> },
}

impl FieldFilter {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldFilter::Categorical {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between(min: Option<f64>, max: Option<f64>) -> Self {
        FieldFilter::Range { min, max }
    }

    /// Build a range from text bounds as typed by a user.
    ///
    /// Blank bounds are open; anything else must be a finite number.
    pub fn range_from_text(field: &str, min: &str, max: &str) -> Result<Self, FilterError> {
        Ok(FieldFilter::Range {
            min: parse_bound(field, min)?,
            max: parse_bound(field, max)?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, FieldFilter::Disabled)
    }

    /// Shape of an enabled filter
    pub fn kind(&self) -> Option<FilterKind> {
        match self {
            FieldFilter::Disabled => None,
            FieldFilter::Categorical { .. } => Some(FilterKind::Categorical),
            FieldFilter::Range { .. } => Some(FilterKind::Range),
        }
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<Option<f64>, FilterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(FilterError::InvalidBound {
            field: field.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// The filters chosen for one query target
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState<K: FilterKey> {
    entries: BTreeMap<K, FieldFilter>,
}

impl<K: FilterKey> Default for FilterState<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: FilterKey> FilterState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: K, filter: FieldFilter) -> &mut Self {
        self.entries.insert(key, filter);
        self
    }

    pub fn with(mut self, key: K, filter: FieldFilter) -> Self {
        self.set(key, filter);
        self
    }

    pub fn get(&self, key: K) -> Option<&FieldFilter> {
        self.entries.get(&key)
    }

    pub fn disable(&mut self, key: K) {
        self.entries.insert(key, FieldFilter::Disabled);
    }

    /// Replace every entry at once, as when a filter dialog is confirmed
    pub fn replace(&mut self, other: FilterState<K>) {
        self.entries = other.entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in field declaration order
    pub fn iter(&self) -> impl Iterator<Item = (K, &FieldFilter)> {
        self.entries.iter().map(|(k, f)| (*k, f))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that are enabled
    pub fn enabled_count(&self) -> usize {
        self.entries.values().filter(|f| f.is_enabled()).count()
    }
}

impl<K: FilterKey> FromIterator<(K, FieldFilter)> for FilterState<K> {
    fn from_iter<I: IntoIterator<Item = (K, FieldFilter)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Malformed filter input. Every variant is a validation failure.
#[derive(Debug, Error, Diagnostic)]
pub enum FilterError {
    #[error("range bound '{raw}' for {field} is not a number")]
    #[diagnostic(code(orderdesk::filter::invalid_bound), help("use plain numbers, e.g. 5..10 or ..100"))]
    InvalidBound { field: String, raw: String },

    #[error("{field} cannot be filtered")]
    #[diagnostic(code(orderdesk::filter::not_filterable))]
    NotFilterable { field: String },

    #[error("{field} takes a {expected} filter")]
    #[diagnostic(code(orderdesk::filter::shape_mismatch))]
    ShapeMismatch { field: String, expected: FilterKind },

    #[error("{field} is not a field of {target}")]
    #[diagnostic(code(orderdesk::filter::foreign_field))]
    ForeignField { field: String, target: String },

    #[error("invalid value for {field}: {source}")]
    #[diagnostic(code(orderdesk::filter::invalid_value))]
    InvalidValue {
        field: String,
        #[source]
        source: ParseValueError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ProductAttr, ViewField};

    const PRICE: Attribute = Attribute::Product(ProductAttr::Price);
    const STOCK: Attribute = Attribute::Product(ProductAttr::Stock);
    const CATEGORY: Attribute = Attribute::Product(ProductAttr::Category);

    #[test]
    fn test_range_from_text_blank_bounds_are_open() {
        let f = FieldFilter::range_from_text("Price", "", " 10 ").unwrap();
        assert_eq!(f, FieldFilter::between(None, Some(10.0)));
    }

    #[test]
    fn test_range_from_text_rejects_non_numeric() {
        let err = FieldFilter::range_from_text("Price", "cheap", "").unwrap_err();
        assert!(matches!(err, FilterError::InvalidBound { ref raw, .. } if raw == "cheap"));
    }

    #[test]
    fn test_iter_follows_declaration_order() {
        let state = FilterState::new()
            .with(STOCK, FieldFilter::between(Some(1.0), None))
            .with(CATEGORY, FieldFilter::one_of(["Biuro"]))
            .with(PRICE, FieldFilter::Disabled);
        let keys: Vec<_> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![CATEGORY, PRICE, STOCK]);
        assert_eq!(state.enabled_count(), 2);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut state = FilterState::new().with(CATEGORY, FieldFilter::one_of(["Biuro"]));
        state.replace(FilterState::new().with(PRICE, FieldFilter::between(Some(1.0), None)));
        assert!(state.get(CATEGORY).is_none());
        assert!(state.get(PRICE).is_some());
    }

    #[test]
    fn test_view_field_keys() {
        let state: FilterState<ViewField> =
            [(ViewField::ProductPrice, FieldFilter::between(None, Some(5.0)))]
                .into_iter()
                .collect();
        assert_eq!(
            state.get(ViewField::ProductPrice).and_then(FieldFilter::kind),
            Some(FilterKind::Range)
        );
    }
}
