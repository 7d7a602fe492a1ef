//! Consistency propagation between product prices and order amounts
//!
//! Two fixed rules, applied only after an update:
//!
//! 1. A product's new price is copied to the amount of every order that
//!    references the product.
//! 2. An order's new amount is copied to the price of the one product the
//!    order references.
//!
//! The counterpart writes are applied without further propagation, so
//! editing one order's amount changes its product's price but leaves the
//! product's other orders alone.

use crate::core::model::{Attribute, OrderAttr, ProductAttr};
use crate::core::notify::ChangeKind;
use crate::core::repository::{EntityRepository, RecordRef, Result};
use crate::core::value::Value;

const PRICE: Attribute = Attribute::Product(ProductAttr::Price);
const AMOUNT: Attribute = Attribute::Order(OrderAttr::Amount);

/// The counterpart write planned for an update
#[derive(Debug, Clone, PartialEq)]
pub enum Propagation {
    /// Set `amount` on every order of the product
    PriceToOrders { product_id: i64, price: Value },
    /// Set `price` on the product of the order
    AmountToProduct { order_id: i64, amount: Value },
}

impl Propagation {
    /// Plan the counterpart of an update, if the attribute has one
    pub fn for_change(attribute: Attribute, id: i64, value: &Value) -> Option<Self> {
        match attribute {
            PRICE => Some(Propagation::PriceToOrders {
                product_id: id,
                price: value.clone(),
            }),
            AMOUNT => Some(Propagation::AmountToProduct {
                order_id: id,
                amount: value.clone(),
            }),
            _ => None,
        }
    }
}

impl EntityRepository {
    /// Apply a planned propagation, returning the rows it rewrote
    pub(crate) fn propagate(&mut self, plan: Propagation) -> Result<Vec<RecordRef>> {
        let (targets, attribute, value) = match plan {
            Propagation::PriceToOrders { product_id, price } => {
                (self.order_ids_for_product(product_id)?, AMOUNT, price)
            }
            Propagation::AmountToProduct { order_id, amount } => {
                let targets: Vec<i64> = self.product_of_order(order_id)?.into_iter().collect();
                (targets, PRICE, amount)
            }
        };

        let mut written = Vec::with_capacity(targets.len());
        for id in targets {
            if let Err(e) = self.write_attribute(attribute, id, &value, ChangeKind::Propagated) {
                tracing::warn!(
                    attribute = %attribute,
                    id,
                    error = %e,
                    written = written.len(),
                    "propagation stopped; the original update is kept"
                );
                return Err(e);
            }
            written.push(RecordRef {
                entity: attribute.entity(),
                id,
            });
        }

        if !written.is_empty() {
            tracing::debug!(attribute = %attribute, rows = written.len(), "propagated update");
        }
        Ok(written)
    }
}
