//! Chainable, immutable queries over one table.
//!
//! Every narrowing operation returns a new [`Relation`]; nothing touches the
//! database until a terminal operation (`load`, `count`, `first`, ...) runs.
//! The same operations are reachable by name through [`DomainObject`], which
//! is how repositories forward to them.

use std::{any::Any, fmt, sync::Arc};

use rusqlite::{types::Value as SqlValue, ToSql};
use tracing::trace;
use warehouse_core::{
    domain::{arg, int_arg, text_arg, unsupported, DomainObject},
    Value, WarehouseError,
};

use crate::{
    convert::{from_sql, to_sql},
    db,
    error::Result,
    expr::{Col, Condition, Order},
    row::Row,
    statement::push_wheres,
    table::Schema,
    traits::{Expression, FromRow},
};

/// Operation names every relation (and every table) answers.
pub const RELATION_OPERATIONS: &[&str] = &[
    "all",
    "where",
    "where_not",
    "where_gt",
    "where_gte",
    "where_lt",
    "where_lte",
    "where_like",
    "where_in",
    "order",
    "limit",
    "offset",
    "count",
    "exists",
    "first",
    "pluck",
    "to_a",
];

#[derive(Clone)]
pub struct Relation {
    schema: Arc<Schema>,
    conditions: Vec<Condition>,
    orders: Vec<(String, Order)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Relation {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            conditions: vec![],
            orders: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.schema.model
    }

    pub fn filter<E: Expression>(mut self, expr: E) -> Self {
        self.conditions.push(Condition::new(&expr));
        self
    }

    pub fn order_by<T>(mut self, col: Col<T>, order: Order) -> Self {
        self.orders.push((col.name().to_string(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies the named scope of this relation's table.
    pub fn scope(&self, name: &str) -> Option<Relation> {
        self.schema
            .scopes
            .get(name)
            .map(|scope| scope(self.clone()))
    }

    pub fn load(&self) -> Result<Vec<Row>> {
        let (sql, params) = self.build_sql("*");
        trace!(sql = %sql, params = params.len(), "loading relation");

        let conn = db::lock(&self.schema.db)?;
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            let mut values = Vec::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                values.push((name.clone(), row.get::<_, SqlValue>(i)?));
            }
            Ok(values)
        })?;

        let mut loaded = Vec::new();
        for values in rows {
            loaded.push(Row::loaded(Arc::clone(&self.schema), values?));
        }
        Ok(loaded)
    }

    /// Loads the matching rows into `E`.
    pub fn fetch<E: FromRow>(&self) -> Result<Vec<E>> {
        let (sql, params) = self.build_sql("*");
        trace!(sql = %sql, params = params.len(), "fetching relation");

        let conn = db::lock(&self.schema.db)?;
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = stmt.query_map(params_ref.as_slice(), E::from_row)?;
        let fetched = rows.collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(fetched)
    }

    /// The first row, ordered by `id` unless an order was given.
    pub fn first(&self) -> Result<Option<Row>> {
        let mut relation = self.clone();
        if relation.orders.is_empty() {
            relation.orders.push(("id".to_string(), Order::Asc));
        }
        Ok(relation.limit(1).load()?.pop())
    }

    pub fn count(&self) -> Result<u64> {
        let (sql, params) = self.build_count_sql();
        trace!(sql = %sql, params = params.len(), "counting relation");

        let conn = db::lock(&self.schema.db)?;
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let count = stmt.query_row(params_ref.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.clone().limit(1).count()? > 0)
    }

    /// Values of a single column, in relation order.
    pub fn pluck<T>(&self, col: &Col<T>) -> Result<Vec<SqlValue>> {
        let (sql, params) = self.build_sql(col.name());
        trace!(sql = %sql, params = params.len(), "plucking relation");

        let conn = db::lock(&self.schema.db)?;
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = stmt.query_map(params_ref.as_slice(), |row| row.get::<_, SqlValue>(0))?;
        let values = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// The SELECT statement this relation runs, with its parameters.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        self.build_sql("*")
    }

    fn build_sql(&self, select: &str) -> (String, Vec<SqlValue>) {
        let mut params = vec![];
        let mut sql = format!("SELECT {} FROM {}", select, self.schema.table);

        push_wheres(&mut sql, &mut params, &self.conditions);

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders = self
                .orders
                .iter()
                .map(|(column, order)| format!("{} {}", column, order.as_sql()))
                .collect::<Vec<_>>();
            sql.push_str(&orders.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit)),
            // SQLite only accepts OFFSET after a LIMIT.
            (None, Some(_)) => sql.push_str(" LIMIT -1"),
            (None, None) => {}
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    fn build_count_sql(&self) -> (String, Vec<SqlValue>) {
        if self.limit.is_some() || self.offset.is_some() {
            let (inner, params) = self.build_sql("1");
            return (format!("SELECT COUNT(*) FROM ({})", inner), params);
        }

        let mut params = vec![];
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.schema.table);
        push_wheres(&mut sql, &mut params, &self.conditions);
        (sql, params)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sql, params) = self.to_sql();
        f.debug_struct("Relation")
            .field("model", &self.schema.model)
            .field("sql", &sql)
            .field("params", &params)
            .finish()
    }
}

fn column(operation: &str, args: &[Value], index: usize) -> warehouse_core::Result<Col<SqlValue>> {
    let name = text_arg(operation, args, index)?;
    Col::named(name).map_err(|e| invalid(operation, e))
}

fn sql_arg(operation: &str, args: &[Value], index: usize) -> warehouse_core::Result<SqlValue> {
    to_sql(arg(operation, args, index)?).map_err(|e| invalid(operation, e))
}

fn sql_list(operation: &str, values: &[Value]) -> warehouse_core::Result<Vec<SqlValue>> {
    values
        .iter()
        .map(|v| to_sql(v).map_err(|e| invalid(operation, e)))
        .collect()
}

fn u32_arg(operation: &str, args: &[Value], index: usize) -> warehouse_core::Result<u32> {
    let n = int_arg(operation, args, index)?;
    u32::try_from(n).map_err(|_| WarehouseError::InvalidArgument {
        operation: operation.to_string(),
        reason: format!("expected a non-negative count, got {n}"),
    })
}

fn invalid(operation: &str, err: impl fmt::Display) -> WarehouseError {
    WarehouseError::InvalidArgument {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

fn object<T: DomainObject>(object: T) -> Value {
    Value::Object(Arc::new(object))
}

impl Relation {
    /// `where` and `where_not` take `column, value` pairs. A nil value
    /// matches NULL, a list matches any of its items.
    fn where_pairs(&self, operation: &str, args: &[Value], negated: bool) -> warehouse_core::Result<Relation> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(WarehouseError::InvalidArgument {
                operation: operation.to_string(),
                reason: format!("expected column/value pairs, got {} argument(s)", args.len()),
            });
        }

        let mut relation = self.clone();
        for index in (0..args.len()).step_by(2) {
            let col = column(operation, args, index)?;
            let condition = match (&args[index + 1], negated) {
                (Value::Nil, false) => Condition::new(&col.null()),
                (Value::Nil, true) => Condition::new(&col.not_null()),
                (Value::List(items), false) => Condition::new(&col.in_(sql_list(operation, items)?)),
                (Value::List(items), true) => Condition::new(&col.not_in(sql_list(operation, items)?)),
                (_, false) => Condition::new(&col.eq(sql_arg(operation, args, index + 1)?)),
                (_, true) => Condition::new(&col.ne(sql_arg(operation, args, index + 1)?)),
            };
            relation = relation.filter(condition);
        }
        Ok(relation)
    }
}

impl DomainObject for Relation {
    fn type_name(&self) -> String {
        format!("{}::Relation", self.schema.model)
    }

    fn responds_to(&self, operation: &str) -> bool {
        RELATION_OPERATIONS.contains(&operation) || self.schema.scopes.contains_key(operation)
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> warehouse_core::Result<Value> {
        trace!(operation, receiver = %self.type_name(), "relation operation");

        // A registered scope shadows the built-in operation of the same name.
        if let Some(relation) = self.scope(operation) {
            return Ok(object(relation));
        }

        let relation = match operation {
            "all" => self.clone(),
            "where" => self.where_pairs(operation, args, false)?,
            "where_not" => self.where_pairs(operation, args, true)?,
            "where_gt" | "where_gte" | "where_lt" | "where_lte" => {
                let col = column(operation, args, 0)?;
                let value = sql_arg(operation, args, 1)?;
                let condition = match operation {
                    "where_gt" => Condition::new(&col.gt(value)),
                    "where_gte" => Condition::new(&col.gte(value)),
                    "where_lt" => Condition::new(&col.lt(value)),
                    _ => Condition::new(&col.lte(value)),
                };
                self.clone().filter(condition)
            }
            "where_like" => {
                let col = column(operation, args, 0)?;
                let pattern = text_arg(operation, args, 1)?;
                self.clone().filter(col.like(pattern))
            }
            "where_in" => {
                let col = column(operation, args, 0)?;
                let items = arg(operation, args, 1)?
                    .as_list()
                    .ok_or_else(|| invalid(operation, "expected a list of values"))?;
                self.clone().filter(col.in_(sql_list(operation, items)?))
            }
            "order" => {
                let col = column(operation, args, 0)?;
                let order = match args.get(1) {
                    Some(_) => text_arg(operation, args, 1)?
                        .parse::<Order>()
                        .map_err(|e| invalid(operation, e))?,
                    None => Order::Asc,
                };
                self.clone().order_by(col, order)
            }
            "limit" => self.clone().limit(u32_arg(operation, args, 0)?),
            "offset" => self.clone().offset(u32_arg(operation, args, 0)?),
            "count" => {
                let count = self.count()?;
                return Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)));
            }
            "exists" => return Ok(Value::Bool(self.exists()?)),
            "first" => return Ok(self.first()?.map(object).unwrap_or_default()),
            "pluck" => {
                let col = column(operation, args, 0)?;
                let values = self.pluck(&col)?.into_iter().map(from_sql).collect();
                return Ok(Value::List(values));
            }
            "to_a" => return Ok(Value::List(self.to_sequence()?)),
            _ => return Err(unsupported(operation, self)),
        };

        Ok(object(relation))
    }

    fn to_sequence(&self) -> warehouse_core::Result<Vec<Value>> {
        Ok(self.load()?.into_iter().map(object).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
