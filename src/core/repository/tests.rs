use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::*;
use crate::core::catalogue::FieldSpec;
use crate::core::filter::{FieldFilter, FilterState};
use crate::core::model::{CustomerAttr, OrderAttr, ProductAttr};
use crate::core::notify::ChangeKind;
use crate::core::predicate::compile;

const PRICE: Attribute = Attribute::Product(ProductAttr::Price);
const STOCK: Attribute = Attribute::Product(ProductAttr::Stock);
const CATEGORY: Attribute = Attribute::Product(ProductAttr::Category);
const AMOUNT: Attribute = Attribute::Order(OrderAttr::Amount);

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn seeded() -> EntityRepository {
    let mut repo = EntityRepository::open_in_memory().unwrap();
    repo.seed_sample_data().unwrap();
    repo
}

fn ids(records: &[crate::core::value::Record]) -> BTreeSet<i64> {
    records.iter().map(|r| r.id()).collect()
}

fn value_of(repo: &EntityRepository, attribute: Attribute, id: i64) -> Value {
    repo.fetch_one(attribute.entity(), id)
        .unwrap()
        .get(attribute)
        .cloned()
        .unwrap()
}

/// One product at price 100 referenced by two orders
fn shared_product() -> (EntityRepository, i64, i64, i64) {
    let mut repo = EntityRepository::open_in_memory().unwrap();
    let c = repo
        .insert(
            EntityKind::Customer,
            &strings(&["Ewa Nowak", "ewa@example.com", "500-000-000", "Łódź"]),
        )
        .unwrap();
    let p = repo
        .insert(EntityKind::Product, &strings(&["Kabel", "Biuro", "100", "10"]))
        .unwrap();
    let o1 = repo
        .insert(
            EntityKind::Order,
            &strings(&[&c.to_string(), &p.to_string(), "2024-01-01", "100", "Nowe"]),
        )
        .unwrap();
    let o2 = repo
        .insert(
            EntityKind::Order,
            &strings(&[&c.to_string(), &p.to_string(), "2024-01-02", "100", "Nowe"]),
        )
        .unwrap();
    (repo, p, o1, o2)
}

#[test]
fn test_fetch_all_column_order_and_sorting() {
    let repo = seeded();
    let orders = repo.fetch_all(EntityKind::Order).unwrap();
    assert_eq!(orders.len(), 5);
    assert_eq!(orders.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        orders[0].values,
        vec![
            Value::Integer(1),
            Value::Integer(1),
            Value::Integer(1),
            Value::from("2023-06-01"),
            Value::Real(2499.99),
            Value::from("Zrealizowane"),
        ]
    );
}

#[test]
fn test_disabled_filters_match_fetch_all() {
    let repo = seeded();
    for entity in EntityKind::ALL {
        let all = repo.fetch_all(entity).unwrap();
        let predicate = compile(&entity, "", &FilterState::new()).unwrap();
        assert_eq!(repo.fetch_filtered(entity, &predicate).unwrap(), all);
    }

    let disabled = FilterState::new()
        .with(CATEGORY, FieldFilter::Disabled)
        .with(PRICE, FieldFilter::Disabled);
    let predicate = compile(&EntityKind::Product, "", &disabled).unwrap();
    assert_eq!(
        repo.fetch_filtered(EntityKind::Product, &predicate).unwrap(),
        repo.fetch_all(EntityKind::Product).unwrap()
    );
}

#[test]
fn test_empty_categorical_matches_disabled() {
    let repo = seeded();
    let filters =
        FilterState::new().with(CATEGORY, FieldFilter::one_of(Vec::<String>::new()));
    let predicate = compile(&EntityKind::Product, "", &filters).unwrap();
    assert_eq!(
        ids(&repo.fetch_filtered(EntityKind::Product, &predicate).unwrap()),
        ids(&repo.fetch_all(EntityKind::Product).unwrap())
    );
}

#[test]
fn test_categorical_filter() {
    let repo = seeded();
    let filters = FilterState::new().with(CATEGORY, FieldFilter::one_of(["Biuro"]));
    let predicate = compile(&EntityKind::Product, "", &filters).unwrap();
    let rows = repo.fetch_filtered(EntityKind::Product, &predicate).unwrap();
    assert_eq!(ids(&rows), BTreeSet::from([5]));
}

#[test]
fn test_range_bounds_are_inclusive() {
    let mut repo = EntityRepository::open_in_memory().unwrap();
    for (name, stock) in [("a", "4"), ("b", "5"), ("c", "7"), ("d", "10"), ("e", "11")] {
        repo.insert(EntityKind::Product, &strings(&[name, "X", "1", stock]))
            .unwrap();
    }
    let filters = FilterState::new().with(STOCK, FieldFilter::between(Some(5.0), Some(10.0)));
    let predicate = compile(&EntityKind::Product, "", &filters).unwrap();
    let rows = repo.fetch_filtered(EntityKind::Product, &predicate).unwrap();
    let stocks: Vec<_> = rows
        .iter()
        .map(|r| r.get(STOCK).and_then(Value::as_i64).unwrap())
        .collect();
    assert_eq!(stocks, vec![5, 7, 10]);
    assert!(stocks.iter().all(|s| (5..=10).contains(s)));

    // same filter state twice, same answer
    let again = repo.fetch_filtered(EntityKind::Product, &predicate).unwrap();
    assert_eq!(rows, again);
}

#[test]
fn test_fetch_filtered_rejects_foreign_predicate() {
    let repo = seeded();
    let predicate = compile(&EntityKind::Customer, "", &FilterState::new()).unwrap();
    let err = repo.fetch_filtered(EntityKind::Order, &predicate).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_search_is_case_insensitive() {
    let repo = seeded();
    let search = |entity: EntityKind, term: &str| {
        let predicate = compile(&entity, term, &FilterState::new()).unwrap();
        ids(&repo.fetch_filtered(entity, &predicate).unwrap())
    };

    assert_eq!(search(EntityKind::Customer, "KOWAL"), BTreeSet::from([1]));
    assert_eq!(search(EntityKind::Customer, "wiś"), BTreeSet::from([2]));
    assert_eq!(search(EntityKind::Customer, "WIŚ"), BTreeSet::from([2]));
    assert_eq!(search(EntityKind::Product, "laptop"), BTreeSet::from([2]));
    assert_eq!(search(EntityKind::Supplier, "s.a."), BTreeSet::from([2, 5]));
    // orders are found by their customer's name
    assert_eq!(search(EntityKind::Order, "nowak"), BTreeSet::from([3]));
    // pattern characters are literal
    assert!(search(EntityKind::Customer, "%").is_empty());
    assert!(search(EntityKind::Customer, "_").is_empty());
}

#[test]
fn test_insert_validation() {
    let mut repo = seeded();
    let err = repo
        .insert(EntityKind::Customer, &strings(&["only", "two"]))
        .unwrap_err();
    assert!(err.is_validation());

    let err = repo
        .insert(EntityKind::Product, &strings(&["Pióro", "Biuro", "tanio", "3"]))
        .unwrap_err();
    assert!(err.is_validation());

    let err = repo
        .insert(EntityKind::Product, &strings(&["Pióro", "Biuro", "-1", "3"]))
        .unwrap_err();
    assert!(err.is_validation());

    let err = repo
        .insert(
            EntityKind::Order,
            &strings(&["99", "1", "2024-01-01", "10", "Nowe"]),
        )
        .unwrap_err();
    assert!(err.to_string().contains("Customer 99 does not exist"));

    let err = repo
        .insert(
            EntityKind::Order,
            &strings(&["1", "1", "yesterday", "10", "Nowe"]),
        )
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(repo.count(EntityKind::Order).unwrap(), 5);
}

#[test]
fn test_insert_assigns_id_and_does_not_propagate() {
    let mut repo = seeded();
    let id = repo
        .insert(
            EntityKind::Order,
            &strings(&["2", "1", "2024-03-01", "10", "Nowe"]),
        )
        .unwrap();
    assert_eq!(id, 6);
    assert_eq!(value_of(&repo, PRICE, 1), Value::Real(2499.99));
}

#[test]
fn test_update_primary_key_is_rejected_for_every_entity() {
    let mut repo = seeded();
    for entity in EntityKind::ALL {
        let before = repo.fetch_all(entity).unwrap();
        for name in ["id", "ID", " Id "] {
            let err = repo.update(entity, 1, name, "42").unwrap_err();
            assert!(matches!(err, RepositoryError::PrimaryKeyImmutable { entity: e } if e == entity));
        }
        // even for a row that does not exist
        assert!(matches!(
            repo.update(entity, 999, "id", "1"),
            Err(RepositoryError::PrimaryKeyImmutable { .. })
        ));
        assert_eq!(repo.fetch_all(entity).unwrap(), before);
    }
    assert_eq!(repo.changes().generation(), 0);
}

#[test]
fn test_update_touches_one_attribute() {
    let mut repo = seeded();
    let before = repo.fetch_one(EntityKind::Customer, 3).unwrap();
    repo.update(EntityKind::Customer, 3, "city", "Opole").unwrap();
    let after = repo.fetch_one(EntityKind::Customer, 3).unwrap();

    let city = Attribute::Customer(CustomerAttr::City);
    assert_eq!(after.get(city), Some(&Value::from("Opole")));
    for attribute in EntityKind::Customer.attributes() {
        if *attribute != city {
            assert_eq!(after.get(*attribute), before.get(*attribute));
        }
    }
}

#[test]
fn test_update_errors() {
    let mut repo = seeded();
    assert!(matches!(
        repo.update(EntityKind::Customer, 99, "city", "Opole"),
        Err(RepositoryError::NotFound { entity: EntityKind::Customer, id: 99 })
    ));
    assert!(repo
        .update(EntityKind::Customer, 1, "shoe_size", "42")
        .unwrap_err()
        .is_validation());
    assert!(repo
        .update(EntityKind::Product, 1, "stock", "-3")
        .unwrap_err()
        .is_validation());
    assert!(repo
        .update(EntityKind::Order, 1, "product_id", "77")
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_price_change_fans_out_but_amount_change_does_not() {
    let (mut repo, p, o1, o2) = shared_product();

    let outcome = repo.update(EntityKind::Product, p, "price", "150").unwrap();
    assert_eq!(outcome.propagated.len(), 2);
    assert_eq!(value_of(&repo, AMOUNT, o1), Value::Real(150.0));
    assert_eq!(value_of(&repo, AMOUNT, o2), Value::Real(150.0));

    let outcome = repo.update(EntityKind::Order, o1, "amount", "200").unwrap();
    assert_eq!(
        outcome.propagated,
        vec![RecordRef {
            entity: EntityKind::Product,
            id: p
        }]
    );
    assert_eq!(value_of(&repo, PRICE, p), Value::Real(200.0));
    assert_eq!(value_of(&repo, AMOUNT, o1), Value::Real(200.0));
    // no cascade back to the sibling order
    assert_eq!(value_of(&repo, AMOUNT, o2), Value::Real(150.0));
}

#[test]
fn test_partial_propagation_keeps_primary_write() {
    let (mut repo, p, o1, _) = shared_product();
    repo.delete(EntityKind::Product, p).unwrap();

    let err = repo.update(EntityKind::Order, o1, "amount", "120").unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::NotFound { entity: EntityKind::Product, id } if id == p
    ));
    assert_eq!(value_of(&repo, AMOUNT, o1), Value::Real(120.0));

    // a negative amount is stored on the order but rejected as a price
    let (mut repo, p, o1, _) = shared_product();
    let err = repo.update(EntityKind::Order, o1, "amount", "-5").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(value_of(&repo, AMOUNT, o1), Value::Real(-5.0));
    assert_eq!(value_of(&repo, PRICE, p), Value::Real(100.0));
}

#[test]
fn test_delete_referenced_customer_leaves_dangling_order() {
    let mut repo = seeded();
    repo.delete(EntityKind::Customer, 1).unwrap();
    assert!(matches!(
        repo.fetch_one(EntityKind::Customer, 1),
        Err(RepositoryError::NotFound { .. })
    ));
    let order = repo.fetch_one(EntityKind::Order, 1).unwrap();
    assert_eq!(
        order.get(Attribute::Order(OrderAttr::CustomerId)),
        Some(&Value::Integer(1))
    );
    assert!(matches!(
        repo.delete(EntityKind::Customer, 1),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_writes_notify_synchronously() {
    let (mut repo, p, o1, o2) = shared_product();
    repo.take_refresh();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    repo.subscribe(move |change| sink.borrow_mut().push(change.clone()));

    repo.update(EntityKind::Product, p, "price", "80").unwrap();
    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].kind, ChangeKind::Updated);
        assert_eq!(seen[0].attribute, Some(PRICE));
        assert_eq!(
            seen[1..].iter().map(|c| (c.id, c.kind)).collect::<Vec<_>>(),
            vec![(o1, ChangeKind::Propagated), (o2, ChangeKind::Propagated)]
        );
    }
    assert!(repo.take_refresh());
    assert!(!repo.take_refresh());

    repo.delete(EntityKind::Order, o2).unwrap();
    assert_eq!(seen.borrow().last().map(|c| c.kind), Some(ChangeKind::Deleted));
}

#[test]
fn test_field_catalogue() {
    let repo = seeded();
    let catalogue = repo.field_catalogue(&EntityKind::Product).unwrap();
    assert_eq!(
        catalogue.get(CATEGORY),
        Some(&FieldSpec::Categorical {
            options: vec!["Biuro".into(), "Elektronika".into()]
        })
    );
    assert_eq!(
        catalogue.get(PRICE),
        Some(&FieldSpec::Range {
            min: 399.99,
            max: 4999.99
        })
    );

    let orders = repo.field_catalogue(&EntityKind::Order).unwrap();
    assert_eq!(
        orders.get(Attribute::Order(OrderAttr::CustomerId)),
        Some(&FieldSpec::Categorical {
            options: strings(&["1", "2", "3", "4", "5"])
        })
    );

    let empty = EntityRepository::open_in_memory().unwrap();
    let catalogue = empty.field_catalogue(&EntityKind::Product).unwrap();
    assert_eq!(catalogue.get(STOCK), Some(&FieldSpec::Range { min: 0.0, max: 0.0 }));
    assert_eq!(
        catalogue.get(CATEGORY),
        Some(&FieldSpec::Categorical { options: vec![] })
    );
}

#[test]
fn test_open_file_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    {
        let mut repo = EntityRepository::open(&path).unwrap();
        repo.seed_sample_data().unwrap();
    }
    let repo = EntityRepository::open(&path).unwrap();
    assert_eq!(repo.count(EntityKind::Supplier).unwrap(), 5);
}
