//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ValueEnum;
use miette::{bail, Result};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    Attribute, Config, EntityKind, EntityRepository, FieldFilter, FilterState, ViewField,
};

/// A `--in FIELD=v1,v2` argument
#[derive(Debug, Clone, PartialEq)]
pub struct InFilter {
    pub field: String,
    pub values: Vec<String>,
}

/// A `--range FIELD=min..max` argument, bounds kept as typed
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub field: String,
    pub min: String,
    pub max: String,
}

/// clap value parser for entity names
pub fn parse_entity(s: &str) -> Result<EntityKind, String> {
    s.parse()
}

/// clap value parser for `FIELD=v1,v2`. An empty value list is allowed and
/// filters nothing.
pub fn parse_in_filter(s: &str) -> Result<InFilter, String> {
    let (field, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE[,VALUE...], got '{}'", s))?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    Ok(InFilter {
        field: field.trim().to_string(),
        values,
    })
}

/// clap value parser for `FIELD=min..max`; either bound may be left out
pub fn parse_range_filter(s: &str) -> Result<RangeFilter, String> {
    let (field, bounds) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=MIN..MAX, got '{}'", s))?;
    let (min, max) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected MIN..MAX in '{}'", s))?;
    Ok(RangeFilter {
        field: field.trim().to_string(),
        min: min.trim().to_string(),
        max: max.trim().to_string(),
    })
}

/// Resolve `--in`/`--range` arguments into a filter state for an entity
pub fn entity_filters(
    entity: EntityKind,
    ins: &[InFilter],
    ranges: &[RangeFilter],
) -> Result<FilterState<Attribute>> {
    let mut state = FilterState::new();
    for f in ins {
        let Some(attribute) = Attribute::parse(entity, &f.field) else {
            bail!("{} has no field '{}'", entity, f.field);
        };
        state.set(attribute, FieldFilter::one_of(f.values.clone()));
    }
    for r in ranges {
        let Some(attribute) = Attribute::parse(entity, &r.field) else {
            bail!("{} has no field '{}'", entity, r.field);
        };
        state.set(
            attribute,
            FieldFilter::range_from_text(attribute.label(), &r.min, &r.max)?,
        );
    }
    Ok(state)
}

/// Resolve `--range` arguments into a filter state for the customer orders view
pub fn view_filters(ranges: &[RangeFilter]) -> Result<FilterState<ViewField>> {
    let mut state = FilterState::new();
    for r in ranges {
        let Some(field) = ViewField::parse(&r.field) else {
            bail!("the customer orders view has no field '{}'", r.field);
        };
        state.set(
            field,
            FieldFilter::range_from_text(field.label(), &r.min, &r.max)?,
        );
    }
    Ok(state)
}

/// Database path from the command line, the config, or the default
pub fn database_path(global: &GlobalOpts) -> PathBuf {
    global
        .db
        .clone()
        .unwrap_or_else(|| Config::load().database_path())
}

/// Open the configured database, which must already exist
pub fn open_repository(global: &GlobalOpts) -> Result<EntityRepository> {
    let path = database_path(global);
    if !path.exists() {
        bail!(
            help = "run `orderdesk init` first, or pass --db",
            "no database at {}",
            path.display()
        );
    }
    Ok(EntityRepository::open(&path)?)
}

/// Resolve `auto` to the configured default format, then to TSV
pub fn effective_format(global: &GlobalOpts) -> OutputFormat {
    match global.format {
        OutputFormat::Auto => Config::load()
            .default_format
            .and_then(|f| OutputFormat::from_str(&f, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(OutputFormat::Tsv),
        other => other,
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OrderAttr;

    #[test]
    fn test_parse_in_filter() {
        assert_eq!(
            parse_in_filter("status=Nowe, Anulowane").unwrap(),
            InFilter {
                field: "status".into(),
                values: vec!["Nowe".into(), "Anulowane".into()],
            }
        );
        assert!(parse_in_filter("city=").unwrap().values.is_empty());
        assert!(parse_in_filter("city").is_err());
    }

    #[test]
    fn test_parse_range_filter() {
        let r = parse_range_filter("price=..100").unwrap();
        assert_eq!((r.min.as_str(), r.max.as_str()), ("", "100"));
        let r = parse_range_filter("Order Amount=5..10").unwrap();
        assert_eq!(r.field, "Order Amount");
        assert!(parse_range_filter("price=5").is_err());
    }

    #[test]
    fn test_entity_filters_resolve_names() {
        let state = entity_filters(
            EntityKind::Order,
            &[parse_in_filter("customer-id=1,2").unwrap()],
            &[parse_range_filter("amount=100..").unwrap()],
        )
        .unwrap();
        assert_eq!(
            state.get(Attribute::Order(OrderAttr::CustomerId)),
            Some(&FieldFilter::one_of(["1", "2"]))
        );
        assert_eq!(
            state.get(Attribute::Order(OrderAttr::Amount)),
            Some(&FieldFilter::between(Some(100.0), None))
        );

        assert!(entity_filters(
            EntityKind::Product,
            &[],
            &[parse_range_filter("price=cheap..").unwrap()]
        )
        .is_err());
        assert!(entity_filters(
            EntityKind::Product,
            &[parse_in_filter("colour=red").unwrap()],
            &[]
        )
        .is_err());
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("Wiśniewska", 6), "Wiś...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("ul. Bitowa 12, Gdańsk"), "\"ul. Bitowa 12, Gdańsk\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
