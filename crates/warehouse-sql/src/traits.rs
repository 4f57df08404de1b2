//! Core traits that power the query builder.
//!
//! - [`Expression`] builds SQL conditions out of columns and operators
//! - [`FromRow`] maps a fetched row into a Rust type

use rusqlite::{types::Value as SqlValue, Row};

use crate::expr::ops::{BinaryOp, InOp, LikeOp, LogicalOp, NullOp};

/// A type that can be rendered as a SQL condition.
///
/// `to_sql` appends bound parameters to `params` and returns the fragment
/// with `?` placeholders.
///
/// ```rust
/// use warehouse_sql::{expr::Col, traits::Expression as _};
///
/// let name = Col::<String>::new("name");
/// let mut params = vec![];
/// let sql = name.eq("Alice".to_string()).to_sql(&mut params);
/// assert_eq!(sql, "name = ?");
/// ```
pub trait Expression: Sized {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String;

    /// Creates a SQL `=` condition.
    fn eq<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "=", value.into())
    }

    /// Creates a SQL `!=` condition.
    fn ne<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "!=", value.into())
    }

    fn gt<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">", value.into())
    }

    fn gte<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">=", value.into())
    }

    fn lt<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<", value.into())
    }

    fn lte<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<=", value.into())
    }

    /// Creates a SQL `LIKE` condition. `pattern` is used as given, so
    /// wildcards are up to the caller.
    fn like(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into())
    }

    /// Creates a SQL `IN` condition.
    fn in_<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<SqlValue>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        InOp::new(self, values, false)
    }

    /// Creates a SQL `NOT IN` condition.
    fn not_in<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<SqlValue>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        InOp::new(self, values, true)
    }

    /// Creates a SQL `IS NULL` condition.
    fn null(self) -> NullOp<Self> {
        NullOp::new(self, true)
    }

    /// Creates a SQL `IS NOT NULL` condition.
    fn not_null(self) -> NullOp<Self> {
        NullOp::new(self, false)
    }

    fn and<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "AND")
    }

    fn or<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "OR")
    }
}

/// A type that can be constructed from a SQLite row.
///
/// Used by [`crate::Relation::fetch`] to load rows into typed structs
/// instead of dynamic [`crate::Row`]s.
///
/// ```rust
/// use warehouse_sql::FromRow;
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
///         Ok(User {
///             id: row.get("id")?,
///             name: row.get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
