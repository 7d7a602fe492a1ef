//! Sample dataset

use rusqlite::params;

use super::{EntityRepository, Result};

const CUSTOMERS: [(i64, &str, &str, &str, &str); 5] = [
    (1, "Michał Kowalski", "mkowalski@example.com", "501-123-456", "Warszawa"),
    (2, "Anna Wiśniewska", "awisnia@example.com", "502-234-567", "Kraków"),
    (3, "Piotr Nowak", "pnowak@example.com", "503-345-678", "Wrocław"),
    (4, "Katarzyna Lewandowska", "klewand@example.com", "504-456-789", "Gdańsk"),
    (5, "Tomasz Zając", "tzajac@example.com", "505-567-890", "Poznań"),
];

const PRODUCTS: [(i64, &str, &str, f64, i64); 5] = [
    (1, "Smartfon XYZ", "Elektronika", 2499.99, 15),
    (2, "Laptop GamePro", "Elektronika", 4999.99, 8),
    (3, "Tablet ArtPad", "Elektronika", 1299.99, 20),
    (4, "Monitor UltraHD", "Elektronika", 1499.99, 12),
    (5, "Drukarka LaserPro", "Biuro", 399.99, 25),
];

const ORDERS: [(i64, i64, i64, &str, f64, &str); 5] = [
    (1, 1, 1, "2023-06-01", 2499.99, "Zrealizowane"),
    (2, 2, 2, "2023-06-02", 499.99, "W realizacji"),
    (3, 3, 3, "2023-06-03", 1299.99, "Dostarczone"),
    (4, 4, 4, "2023-06-04", 899.99, "Anulowane"),
    (5, 5, 5, "2023-06-05", 399.99, "Zwrócone"),
];

const SUPPLIERS: [(i64, &str, &str, &str, &str); 5] = [
    (1, "TechPro Sp. z o.o.", "info@techpro.pl", "ul. Innowacyjna 1, Warszawa", "zakupy@techpro.pl"),
    (2, "GadgetMasters S.A.", "kontakt@gadgetmasters.pl", "Al. Cyfrowa 10, Kraków", "zamowienia@gadgetmasters.pl"),
    (3, "ElektroGalaktyka Sp.k.", "biuro@elektrogalaktyka.pl", "ul. Elektroniczna 25, Wrocław", "zakupy@elektrogalaktyka.pl"),
    (4, "CyberTech Sp. z o.o.", "info@cybertech.pl", "ul. Bitowa 12, Gdańsk", "zamowienia@cybertech.pl"),
    (5, "PrintExpert S.A.", "kontakt@printexpert.pl", "Al. Drukarska 5, Poznań", "zakupy@printexpert.pl"),
];

impl EntityRepository {
    /// Replace the contents of every table with the sample dataset.
    ///
    /// Existing rows are discarded. Rows are written directly, so no change
    /// notifications are raised and nothing propagates.
    pub fn seed_sample_data(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM orders; DELETE FROM customers; DELETE FROM products; DELETE FROM suppliers;",
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO customers (id, name, email, phone, city) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (id, name, email, phone, city) in CUSTOMERS {
                stmt.execute(params![id, name, email, phone, city])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO products (id, name, category, price, stock) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (id, name, category, price, stock) in PRODUCTS {
                stmt.execute(params![id, name, category, price, stock])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO orders (id, customer_id, product_id, date, amount, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (id, customer_id, product_id, date, amount, status) in ORDERS {
                stmt.execute(params![id, customer_id, product_id, date, amount, status])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO suppliers (id, name, contact, address, email) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (id, name, contact, address, email) in SUPPLIERS {
                stmt.execute(params![id, name, contact, address, email])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            customers = CUSTOMERS.len(),
            products = PRODUCTS.len(),
            orders = ORDERS.len(),
            suppliers = SUPPLIERS.len(),
            "loaded sample data"
        );
        Ok(())
    }
}
