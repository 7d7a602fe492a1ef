//! Field catalogue: which fields of a target can be filtered, and with what
//! options, given the rows currently stored

use serde::Serialize;

use crate::core::filter::FilterKey;
use crate::core::model::{Attribute, FilterKind};
use crate::core::predicate::QueryTarget;

/// Filter options for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldSpec {
    /// Distinct values present in the column, ascending
    Categorical { options: Vec<String> },
    /// Current extent of the column; `0..0` when there are no rows
    Range { min: f64, max: f64 },
}

impl FieldSpec {
    pub fn kind(&self) -> FilterKind {
        match self {
            FieldSpec::Categorical { .. } => FilterKind::Categorical,
            FieldSpec::Range { .. } => FilterKind::Range,
        }
    }
}

/// Column statistics a catalogue is built from
pub trait ColumnStats {
    type Error;

    /// Distinct non-null values of a column, in ascending column order
    fn distinct_values(&self, attribute: Attribute) -> Result<Vec<String>, Self::Error>;

    /// Minimum and maximum of a numeric column, `None` when it has no rows
    fn value_range(&self, attribute: Attribute) -> Result<Option<(f64, f64)>, Self::Error>;
}

/// Ordered field specs of one query target
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalogue<K> {
    entries: Vec<(K, FieldSpec)>,
}

impl<K: FilterKey> FieldCatalogue<K> {
    /// Build the catalogue of a target from live column statistics
    pub fn build<T, S>(target: &T, stats: &S) -> Result<Self, S::Error>
    where
        T: QueryTarget<Field = K>,
        S: ColumnStats + ?Sized,
    {
        let mut entries = Vec::new();
        for field in target.filter_fields() {
            let source = field.source();
            let spec = match field.filter_kind() {
                Some(FilterKind::Categorical) => FieldSpec::Categorical {
                    options: stats.distinct_values(source)?,
                },
                Some(FilterKind::Range) => {
                    let (min, max) = stats.value_range(source)?.unwrap_or((0.0, 0.0));
                    FieldSpec::Range { min, max }
                }
                None => continue,
            };
            entries.push((field, spec));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(K, FieldSpec)] {
        &self.entries
    }

    pub fn get(&self, field: K) -> Option<&FieldSpec> {
        self.entries
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, spec)| spec)
    }

    /// Look a field up by its display label, ignoring case
    pub fn find(&self, label: &str) -> Option<(K, &FieldSpec)> {
        self.entries
            .iter()
            .find(|(k, _)| k.label().eq_ignore_ascii_case(label.trim()))
            .map(|(k, spec)| (*k, spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CustomerOrderView, EntityKind, ProductAttr, ViewField};
    use std::collections::HashMap;
    use std::convert::Infallible;

    #[derive(Default)]
    struct FakeStats {
        values: HashMap<Attribute, Vec<String>>,
        ranges: HashMap<Attribute, (f64, f64)>,
    }

    impl ColumnStats for FakeStats {
        type Error = Infallible;

        fn distinct_values(&self, attribute: Attribute) -> Result<Vec<String>, Infallible> {
            Ok(self.values.get(&attribute).cloned().unwrap_or_default())
        }

        fn value_range(&self, attribute: Attribute) -> Result<Option<(f64, f64)>, Infallible> {
            Ok(self.ranges.get(&attribute).copied())
        }
    }

    #[test]
    fn test_product_catalogue() {
        let mut stats = FakeStats::default();
        stats.values.insert(
            Attribute::Product(ProductAttr::Category),
            vec!["Biuro".into(), "Elektronika".into()],
        );
        stats
            .ranges
            .insert(Attribute::Product(ProductAttr::Price), (49.99, 2499.99));

        let cat = FieldCatalogue::build(&EntityKind::Product, &stats).unwrap();
        let labels: Vec<_> = cat.entries().iter().map(|(k, _)| k.label()).collect();
        assert_eq!(labels, vec!["Category", "Price", "Stock"]);
        assert_eq!(
            cat.get(Attribute::Product(ProductAttr::Price)),
            Some(&FieldSpec::Range {
                min: 49.99,
                max: 2499.99
            })
        );
        // no rows: degenerate range
        assert_eq!(
            cat.get(Attribute::Product(ProductAttr::Stock)),
            Some(&FieldSpec::Range { min: 0.0, max: 0.0 })
        );
    }

    #[test]
    fn test_supplier_has_no_filters() {
        let cat = FieldCatalogue::build(&EntityKind::Supplier, &FakeStats::default()).unwrap();
        assert!(cat.is_empty());
    }

    #[test]
    fn test_view_catalogue_reads_source_columns() {
        let mut stats = FakeStats::default();
        stats
            .ranges
            .insert(Attribute::Product(ProductAttr::Price), (10.0, 20.0));
        let cat = FieldCatalogue::build(&CustomerOrderView, &stats).unwrap();
        assert_eq!(cat.len(), 2);
        let (field, spec) = cat.find("product price").unwrap();
        assert_eq!(field, ViewField::ProductPrice);
        assert_eq!(spec.kind(), FilterKind::Range);
    }

    #[test]
    fn test_spec_serializes_with_kind_tag() {
        let json = serde_json::to_string(&FieldSpec::Categorical {
            options: vec!["Kraków".into()],
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"categorical","options":["Kraków"]}"#);
    }
}
