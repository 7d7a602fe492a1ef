//! SQLite-backed entity repository
//!
//! Generic create/read/update/delete over the four entities. All SQL is
//! assembled from the static attribute tables in [`crate::core::model`];
//! values are always bound as parameters.
//!
//! Writes that touch `Product.price` or `Order.amount` are followed by their
//! counterpart write (see [`crate::core::propagation`]), and every committed
//! write is announced on the repository's [`ChangeFeed`].

mod mutations;
mod queries;
mod schema;
mod seed;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;

use miette::Diagnostic;
use rusqlite::Connection;
use thiserror::Error;

use crate::core::filter::FilterError;
use crate::core::model::{Attribute, EntityKind};
use crate::core::notify::{ChangeFeed, RecordChanged};
use crate::core::value::Value;

pub use schema::register_functions;

/// Errors raised by repository operations
#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    #[error("{0}")]
    #[diagnostic(code(orderdesk::validation))]
    Validation(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Filter(#[from] FilterError),

    #[error("the id of a {entity} cannot be changed")]
    #[diagnostic(
        code(orderdesk::primary_key_immutable),
        help("ids are assigned when a record is added")
    )]
    PrimaryKeyImmutable { entity: EntityKind },

    #[error("{entity} {id} not found")]
    #[diagnostic(code(orderdesk::not_found))]
    NotFound { entity: EntityKind, id: i64 },

    #[error("database error: {0}")]
    #[diagnostic(code(orderdesk::storage))]
    Storage(#[from] rusqlite::Error),
}

impl RepositoryError {
    /// True for every kind of rejected input
    pub fn is_validation(&self) -> bool {
        matches!(self, RepositoryError::Validation(_) | RepositoryError::Filter(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }
}

pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;

/// A reference to one stored row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub entity: EntityKind,
    pub id: i64,
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity, self.id)
    }
}

/// Result of a successful update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub attribute: Attribute,
    pub id: i64,
    /// The value as stored
    pub value: Value,
    /// Rows rewritten by consistency propagation
    pub propagated: Vec<RecordRef>,
}

/// The entity store
pub struct EntityRepository {
    pub(crate) conn: Connection,
    changes: ChangeFeed,
}

impl EntityRepository {
    /// Open (or create) a database file and make sure the tables exist
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "opening database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        let repo = Self {
            conn,
            changes: ChangeFeed::new(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// Register a callback invoked synchronously after every committed write
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&RecordChanged) + 'static,
    {
        self.changes.subscribe(callback);
    }

    /// Whether anything was written since the last call
    pub fn take_refresh(&mut self) -> bool {
        self.changes.take_refresh()
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    pub(crate) fn publish(&mut self, change: RecordChanged) {
        self.changes.publish(change);
    }
}

impl fmt::Debug for EntityRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("path", &self.conn.path())
            .field("changes", &self.changes)
            .finish()
    }
}
