//! Conversions between repository values and SQLite values.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::types::Value as SqlValue;
use warehouse_core::Value;

use crate::error::{Result, SqlError};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("unable to compile identifier regex")
});

/// Checks that `name` can be spliced into SQL as a table or column name.
pub fn identifier(name: &str) -> Result<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(SqlError::InvalidIdentifier(name.to_string()))
    }
}

pub fn to_sql(value: &Value) -> Result<SqlValue> {
    match value {
        Value::Nil => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Int(i) => Ok(SqlValue::Integer(*i)),
        Value::Float(f) => Ok(SqlValue::Real(*f)),
        Value::Text(s) => Ok(SqlValue::Text(s.clone())),
        Value::Bytes(bytes) => Ok(SqlValue::Blob(bytes.clone())),
        other => Err(SqlError::UnsupportedValue(other.type_name())),
    }
}

pub fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Nil,
        SqlValue::Integer(i) => Value::Int(i),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(bytes) => Value::Bytes(bytes),
    }
}
