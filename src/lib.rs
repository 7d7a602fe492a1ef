//! orderdesk: customers, orders, products and suppliers in one SQLite file
//!
//! The library holds the filter compilation engine, the entity repository
//! with its price/amount consistency rule, and the joined customer orders
//! view. The `orderdesk` binary is a thin command-line front end over it.

pub mod cli;
pub mod core;
