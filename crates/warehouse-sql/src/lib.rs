//! A SQLite data-access layer that repositories can wrap.
//!
//! A [`Table`] is a model type, a [`Relation`] is a chainable query over it
//! and a [`Row`] is one record. All three implement
//! [`warehouse_core::DomainObject`], reporting the type names
//! `<Model>::Table`, `<Model>::Relation` and `<Model>`, so the default
//! chainable allow-list keeps tables and relations wrapped while terminal
//! results come back as plain values.

pub mod convert;
pub mod db;
pub mod error;
pub mod expr;
pub mod macros;
pub mod relation;
pub mod row;
pub mod statement;
pub mod table;
pub mod traits;

pub use db::Db;
pub use error::SqlError;
pub use expr::{Col, Order};
pub use relation::Relation;
pub use row::Row;
pub use table::{Scope, Table};
pub use traits::{Expression, FromRow};
