//! SQL expression operators.
//!
//! These structs represent compound expressions like `col = ?` or
//! `col LIKE ?`. Each implements [`Expression`] and recursively builds SQL
//! fragments.

use rusqlite::types::Value as SqlValue;

use crate::traits::Expression;

/// Represents a binary comparison (e.g., `=`, `>`, `<=`).
pub struct BinaryOp<L> {
    left: L,
    op: &'static str,
    right: SqlValue,
}

impl<L> BinaryOp<L> {
    pub fn new(left: L, op: &'static str, right: SqlValue) -> Self {
        Self {
            left,
            op,
            right,
        }
    }
}

impl<L: Expression> Expression for BinaryOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.right.clone());
        format!("{} {} ?", left_sql, self.op)
    }
}

pub struct LikeOp<L> {
    left: L,
    pattern: String,
}

impl<L> LikeOp<L> {
    pub const fn new(left: L, pattern: String) -> Self {
        Self {
            left,
            pattern,
        }
    }
}

impl<L: Expression> Expression for LikeOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(SqlValue::Text(self.pattern.clone()));
        format!("{} LIKE ?", left_sql)
    }
}

/// Represents an `IN` or `NOT IN` clause.
pub struct InOp<L> {
    left: L,
    values: Vec<SqlValue>,
    negated: bool,
}

impl<L> InOp<L> {
    pub fn new(left: L, values: Vec<SqlValue>, negated: bool) -> Self {
        Self {
            left,
            values,
            negated,
        }
    }
}

impl<L: Expression> Expression for InOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        // `IN ()` is a syntax error in SQLite; an empty set matches nothing.
        if self.values.is_empty() {
            return if self.negated { "1 = 1" } else { "1 = 0" }.to_string();
        }
        let left_sql = self.left.to_sql(params);
        let placeholders = vec!["?"; self.values.len()].join(", ");
        params.extend(self.values.iter().cloned());
        let op = if self.negated { "NOT IN" } else { "IN" };
        format!("{} {} ({})", left_sql, op, placeholders)
    }
}

/// Represents an `IS NULL` or `IS NOT NULL` check.
pub struct NullOp<L> {
    left: L,
    is_null: bool,
}

impl<L> NullOp<L> {
    pub fn new(left: L, is_null: bool) -> Self {
        Self {
            left,
            is_null,
        }
    }
}

impl<L: Expression> Expression for NullOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        let op = if self.is_null {
            "IS NULL"
        } else {
            "IS NOT NULL"
        };
        format!("{} {}", left_sql, op)
    }
}

/// Combines two expressions with `AND` or `OR`.
pub struct LogicalOp<L, R> {
    left: L,
    right: R,
    op: &'static str,
}

impl<L, R> LogicalOp<L, R> {
    pub fn new(left: L, right: R, op: &'static str) -> Self {
        Self {
            left,
            right,
            op,
        }
    }
}

impl<L: Expression, R: Expression> Expression for LogicalOp<L, R> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        let right_sql = self.right.to_sql(params);
        format!("({} {} {})", left_sql, self.op, right_sql)
    }
}

/// An expression rendered once into owned SQL and parameters, so relations
/// holding it stay cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    sql: String,
    params: Vec<SqlValue>,
}

impl Condition {
    pub fn new<E: Expression>(expr: &E) -> Self {
        let mut params = Vec::new();
        let sql = expr.to_sql(&mut params);
        Self {
            sql,
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

impl Expression for Condition {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        params.extend(self.params.iter().cloned());
        self.sql.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Col;

    const NAME: Col<String> = Col::new("name");
    const AGE: Col<i64> = Col::new("age");

    fn render<E: Expression>(expr: E) -> (String, Vec<SqlValue>) {
        let mut params = vec![];
        let sql = expr.to_sql(&mut params);
        (sql, params)
    }

    #[test]
    fn test_binary_ops() {
        assert_eq!(
            render(AGE.gte(18)),
            ("age >= ?".to_string(), vec![SqlValue::Integer(18)])
        );
        assert_eq!(render(NAME.ne("x".to_string())).0, "name != ?");
    }

    #[test]
    fn test_like_keeps_pattern() {
        let (sql, params) = render(NAME.like("Al%"));
        assert_eq!(sql, "name LIKE ?");
        assert_eq!(params, vec![SqlValue::Text("Al%".into())]);
    }

    #[test]
    fn test_in_op() {
        let (sql, params) = render(AGE.in_([1, 2, 3]));
        assert_eq!(sql, "age IN (?, ?, ?)");
        assert_eq!(params.len(), 3);

        assert_eq!(render(AGE.in_(Vec::<i64>::new())).0, "1 = 0");
        assert_eq!(render(AGE.not_in(Vec::<i64>::new())).0, "1 = 1");
    }

    #[test]
    fn test_null_and_logical_ops() {
        let (sql, params) = render(NAME.null().or(AGE.lt(3).and(AGE.not_null())));
        assert_eq!(sql, "(name IS NULL OR (age < ? AND age IS NOT NULL))");
        assert_eq!(params, vec![SqlValue::Integer(3)]);
    }

    #[test]
    fn test_condition_replays_params() {
        let condition = Condition::new(&AGE.gt(1).and(NAME.eq("Bob".to_string())));
        assert_eq!(condition.sql(), "(age > ? AND name = ?)");

        let (sql, params) = render(condition.clone().and(AGE.lte(9)));
        assert_eq!(sql, "((age > ? AND name = ?) AND age <= ?)");
        assert_eq!(params.len(), 3);
    }
}
