//! Database schema initialization

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use super::{EntityRepository, Result};
use crate::core::predicate::FOLD_CONTAINS;

impl EntityRepository {
    /// Create the tables if they do not exist yet
    pub(super) fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Referenced rows may be deleted; orders keep their ids
            PRAGMA foreign_keys = OFF;

            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY,
                name TEXT,
                email TEXT,
                phone TEXT,
                city TEXT
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                name TEXT,
                category TEXT,
                price REAL,
                stock INTEGER
            );

            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY,
                customer_id INTEGER,
                product_id INTEGER,
                date TEXT,
                amount REAL,
                status TEXT,
                FOREIGN KEY (customer_id) REFERENCES customers(id),
                FOREIGN KEY (product_id) REFERENCES products(id)
            );
            CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
            CREATE INDEX IF NOT EXISTS idx_orders_product ON orders(product_id);

            CREATE TABLE IF NOT EXISTS suppliers (
                id INTEGER PRIMARY KEY,
                name TEXT,
                contact TEXT,
                address TEXT,
                email TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Drop every table and recreate the empty schema
    pub fn reset_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS orders;
            DROP TABLE IF EXISTS customers;
            DROP TABLE IF EXISTS products;
            DROP TABLE IF EXISTS suppliers;
            "#,
        )?;
        tracing::info!("schema reset");
        self.init_schema()
    }
}

/// Register the SQL functions the compiled predicates rely on.
///
/// `fold_contains(haystack, needle)` is true when `needle` occurs in
/// `haystack` ignoring case. NULL on either side never matches.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CONTAINS,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => fold_contains(&h, &n),
                _ => false,
            })
        },
    )
}

fn fold_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
