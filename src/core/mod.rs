//! Core module - entity model, filtering, storage and consistency rules

pub mod catalogue;
pub mod config;
pub mod filter;
pub mod model;
pub mod notify;
pub mod predicate;
pub mod projection;
pub mod propagation;
pub mod repository;
pub mod transfer;
pub mod value;

pub use catalogue::{ColumnStats, FieldCatalogue, FieldSpec};
pub use config::Config;
pub use filter::{FieldFilter, FilterError, FilterKey, FilterState};
pub use model::{
    Attribute, CustomerAttr, CustomerOrderView, EntityKind, FilterKind, OrderAttr, ProductAttr,
    SupplierAttr, ValueKind, ViewField,
};
pub use notify::{ChangeFeed, ChangeKind, RecordChanged};
pub use predicate::{compile, Predicate, PredicateScope, QueryTarget};
pub use projection::{CustomerOrderRow, ProjectionError};
pub use propagation::Propagation;
pub use repository::{EntityRepository, RecordRef, RepositoryError, UpdateOutcome};
pub use transfer::{export_csv, import_csv, ImportStats, TransferError};
pub use value::{Record, Value};
