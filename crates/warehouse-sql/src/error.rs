//! Error types for warehouse-sql.

use miette::Diagnostic;
use thiserror::Error;
use warehouse_core::WarehouseError;

#[derive(Error, Diagnostic, Debug)]
pub enum SqlError {
    #[error("Database query failed: {0}")]
    #[diagnostic(
        code(warehouse_sql::query),
        help("Check that the table exists and the columns match the schema")
    )]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    #[diagnostic(
        code(warehouse_sql::poisoned),
        help("A previous query panicked while holding the connection")
    )]
    Poisoned,

    #[error("Couldn't find {model} with id={id}")]
    #[diagnostic(
        code(warehouse_sql::record_not_found),
        help("The record may have been destroyed")
    )]
    RecordNotFound { model: String, id: i64 },

    #[error("Record of {0} has not been saved")]
    #[diagnostic(
        code(warehouse_sql::not_persisted),
        help("Save the record before reloading it")
    )]
    NotPersisted(String),

    #[error("Invalid SQL identifier: `{0}`")]
    #[diagnostic(
        code(warehouse_sql::invalid_identifier),
        help("Table and column names may contain letters, digits and underscores")
    )]
    InvalidIdentifier(String),

    #[error("Value of type {0} cannot be bound as a SQL parameter")]
    #[diagnostic(
        code(warehouse_sql::unsupported_value),
        help("Only nil, booleans, integers, floats and text can be stored")
    )]
    UnsupportedValue(String),
}

impl From<SqlError> for WarehouseError {
    fn from(err: SqlError) -> Self {
        WarehouseError::backend(err)
    }
}

pub type Result<T> = std::result::Result<T, SqlError>;
