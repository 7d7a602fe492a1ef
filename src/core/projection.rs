//! Customer/order/product joined view
//!
//! One row per order that has both its customer and its product. The rows
//! are computed on every read; edits made against the view are routed to
//! the order or product they were read from.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::model::{CustomerOrderView, EntityKind, ViewField};
use crate::core::predicate::{Predicate, PredicateScope};
use crate::core::repository::{EntityRepository, RepositoryError, UpdateOutcome};

/// A row of the customer orders view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrderRow {
    pub customer_id: i64,
    pub customer_name: String,
    pub order_date: String,
    pub order_amount: f64,
    pub product_name: String,
    pub product_price: f64,
    #[serde(skip)]
    pub order_id: i64,
    #[serde(skip)]
    pub product_id: i64,
}

impl CustomerOrderRow {
    /// Display text of one view column
    pub fn field(&self, field: ViewField) -> String {
        match field {
            ViewField::CustomerId => self.customer_id.to_string(),
            ViewField::CustomerName => self.customer_name.clone(),
            ViewField::OrderDate => self.order_date.clone(),
            ViewField::OrderAmount => self.order_amount.to_string(),
            ViewField::ProductName => self.product_name.clone(),
            ViewField::ProductPrice => self.product_price.to_string(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ProjectionError {
    #[error("{field} cannot be edited from the customer orders view")]
    #[diagnostic(
        code(orderdesk::view::unsupported_edit),
        help("only Order Amount and Product Price are editable here")
    )]
    UnsupportedEdit { field: ViewField },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),
}

const VIEW_SQL: &str = "\
SELECT customers.id, customers.name, orders.date, orders.amount, \
products.name, products.price, orders.id, products.id \
FROM customers \
JOIN orders ON customers.id = orders.customer_id \
JOIN products ON orders.product_id = products.id";

impl EntityRepository {
    /// Every row of the view, ordered by order id
    pub fn project(&self) -> Result<Vec<CustomerOrderRow>, RepositoryError> {
        self.project_filtered(&Predicate::always(&CustomerOrderView))
    }

    /// Rows of the view matching a predicate compiled for the view
    pub fn project_filtered(
        &self,
        predicate: &Predicate,
    ) -> Result<Vec<CustomerOrderRow>, RepositoryError> {
        if predicate.scope() != PredicateScope::CustomerOrders {
            return Err(RepositoryError::validation(
                "predicate was not compiled for the customer orders view",
            ));
        }
        let sql = format!("{} WHERE {} ORDER BY orders.id", VIEW_SQL, predicate.sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(predicate.params().as_slice(), |row| {
                Ok(CustomerOrderRow {
                    customer_id: row.get(0)?,
                    customer_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    order_date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    order_amount: row.get::<_, Option<f64>>(3)?.unwrap_or_default(),
                    product_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    product_price: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
                    order_id: row.get(6)?,
                    product_id: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Apply an edit made on a view row identified by its order.
    ///
    /// Order Amount is written to the order and Product Price to the order's
    /// product; both then propagate as ordinary updates. Any other column is
    /// rejected without touching storage.
    pub fn apply_view_edit(
        &mut self,
        order_id: i64,
        field: ViewField,
        raw: &str,
    ) -> Result<UpdateOutcome, ProjectionError> {
        let outcome = match field {
            ViewField::OrderAmount => self.update(EntityKind::Order, order_id, "amount", raw)?,
            ViewField::ProductPrice => {
                let product_id = self
                    .product_of_order(order_id)?
                    .ok_or_else(|| {
                        RepositoryError::validation(format!("order {} has no product", order_id))
                    })?;
                self.update(EntityKind::Product, product_id, "price", raw)?
            }
            ViewField::CustomerId
            | ViewField::CustomerName
            | ViewField::OrderDate
            | ViewField::ProductName => {
                tracing::debug!(%field, order_id, "rejected view edit");
                return Err(ProjectionError::UnsupportedEdit { field });
            }
        };
        Ok(outcome)
    }
}
