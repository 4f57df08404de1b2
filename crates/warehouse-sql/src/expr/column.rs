//! Typed and runtime-named column references.
//!
//! `Col<T>` ties a column name to the Rust type stored in it. Columns
//! declared with [`crate::define_columns!`] are `&'static str` backed;
//! columns named at runtime (by the operations a repository forwards) are
//! checked with [`crate::convert::identifier`] before they reach SQL.

use std::{borrow::Cow, fmt, marker::PhantomData, str::FromStr};

use rusqlite::types::Value as SqlValue;

use crate::{
    convert::identifier,
    error::{Result, SqlError},
    traits::Expression,
};

pub struct Col<T> {
    name: Cow<'static, str>,
    _type: PhantomData<T>,
}

impl<T> Col<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Col<SqlValue> {
    /// An untyped column named at runtime.
    pub fn named(name: &str) -> Result<Self> {
        let name = identifier(name)?;
        Ok(Self {
            name: Cow::Owned(name.to_string()),
            _type: PhantomData,
        })
    }
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Col<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Col").field(&self.name).finish()
    }
}

impl<T> Expression for Col<T> {
    fn to_sql(&self, _params: &mut Vec<SqlValue>) -> String {
        self.name.to_string()
    }
}

/// Sort direction of an ORDER BY clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(SqlError::InvalidIdentifier(s.to_string())),
        }
    }
}
