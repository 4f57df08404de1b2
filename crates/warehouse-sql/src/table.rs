//! Model types bound to a table.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use warehouse_core::{
    domain::{unsupported, DomainObject},
    Value,
};

use crate::{
    convert::identifier,
    db::Db,
    error::{Result, SqlError},
    expr::Col,
    relation::{Relation, RELATION_OPERATIONS},
    row::Row,
    traits::Expression,
};

/// A named scope: a transformation of a relation registered on its table.
pub type Scope = Arc<dyn Fn(Relation) -> Relation + Send + Sync>;

/// What tables, relations and rows of one model share.
#[derive(Clone)]
pub(crate) struct Schema {
    pub model: String,
    pub table: String,
    pub db: Db,
    pub scopes: HashMap<String, Scope>,
}

/// A model type. Its type name is `<Model>::Table`.
#[derive(Clone)]
pub struct Table {
    schema: Arc<Schema>,
}

impl Table {
    pub fn new(db: Db, model: impl Into<String>, table: &str) -> Result<Self> {
        let table = identifier(table)?.to_string();
        Ok(Self {
            schema: Arc::new(Schema {
                model: model.into(),
                table,
                db,
                scopes: HashMap::new(),
            }),
        })
    }

    /// Registers a zero-argument scope, answered by this table and every
    /// relation built from it afterwards. A scope named like a relation
    /// operation replaces that operation.
    pub fn with_scope<F>(mut self, name: impl Into<String>, scope: F) -> Self
    where
        F: Fn(Relation) -> Relation + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.schema)
            .scopes
            .insert(name.into(), Arc::new(scope));
        self
    }

    pub fn model(&self) -> &str {
        &self.schema.model
    }

    pub fn table_name(&self) -> &str {
        &self.schema.table
    }

    pub fn db(&self) -> &Db {
        &self.schema.db
    }

    /// An unfiltered relation over every row of the table.
    pub fn all(&self) -> Relation {
        Relation::new(Arc::clone(&self.schema))
    }

    /// A new, unsaved row.
    pub fn build<I, K, V>(&self, attributes: I) -> Row
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Row::new(Arc::clone(&self.schema));
        for (name, value) in attributes {
            row.set(name, value);
        }
        row
    }

    pub fn find(&self, id: i64) -> Result<Row> {
        self.all()
            .filter(Col::<i64>::new("id").eq(id))
            .first()?
            .ok_or_else(|| SqlError::RecordNotFound {
                model: self.schema.model.clone(),
                id,
            })
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("model", &self.schema.model)
            .field("table", &self.schema.table)
            .finish()
    }
}

impl DomainObject for Table {
    fn type_name(&self) -> String {
        format!("{}::Table", self.schema.model)
    }

    fn responds_to(&self, operation: &str) -> bool {
        operation == "table_name"
            || RELATION_OPERATIONS.contains(&operation)
            || self.schema.scopes.contains_key(operation)
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> warehouse_core::Result<Value> {
        if operation == "table_name" && !self.schema.scopes.contains_key(operation) {
            return Ok(Value::from(self.table_name()));
        }
        if !self.responds_to(operation) {
            return Err(unsupported(operation, self));
        }
        self.all().invoke(operation, args)
    }

    fn to_sequence(&self) -> warehouse_core::Result<Vec<Value>> {
        self.all().to_sequence()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, expr::Order};

    fn users() -> Table {
        let db = db::open_in_memory().unwrap();
        db::execute_batch(
            &db,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO users (name) VALUES ('Carol'), ('alice'), ('Bob');",
        )
        .unwrap();

        Table::new(db, "User", "users")
            .unwrap()
            .with_scope("alphabetically", |r| r.order_by(Col::<String>::new("name"), Order::Asc))
    }

    #[test]
    fn test_new_rejects_bad_table_name() {
        let db = db::open_in_memory().unwrap();
        assert!(matches!(
            Table::new(db, "User", "users; DROP TABLE users"),
            Err(SqlError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_type_name_and_table_name() {
        let users = users();
        assert_eq!(users.type_name(), "User::Table");
        assert_eq!(users.invoke("table_name", &[]).unwrap(), Value::from("users"));
    }

    #[test]
    fn test_responds_to_relation_operations_and_scopes() {
        let users = users();
        for op in ["all", "where", "count", "alphabetically", "table_name"] {
            assert!(users.responds_to(op), "{op}");
        }
        assert!(!users.responds_to("destroy_all"));
        assert!(matches!(
            users.invoke("destroy_all", &[]),
            Err(warehouse_core::WarehouseError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_operations_start_from_all() {
        let users = users();

        let all = users.invoke("all", &[]).unwrap();
        assert_eq!(all.type_name(), "User::Relation");
        assert_eq!(users.invoke("count", &[]).unwrap(), Value::Int(3));

        let sorted = users.invoke("alphabetically", &[]).unwrap();
        let names: Vec<Value> = sorted
            .downcast_ref::<Relation>()
            .unwrap()
            .load()
            .unwrap()
            .iter()
            .map(|row| row.get("name").cloned().unwrap_or_default())
            .collect();
        assert_eq!(names, vec![Value::from("Bob"), Value::from("Carol"), Value::from("alice")]);
    }

    #[test]
    fn test_find() {
        let users = users();
        let bob = users.find(3).unwrap();
        assert_eq!(bob.get("name"), Some(&Value::from("Bob")));

        assert!(matches!(
            users.find(99),
            Err(SqlError::RecordNotFound { id: 99, .. })
        ));
    }

    #[test]
    fn test_scope_shadows_builtin_operation() {
        let users = users().with_scope("count", |r| r.filter(Col::<String>::new("name").like("B%")));
        assert!(users.responds_to("count"));

        let scoped = users.invoke("count", &[]).unwrap();
        assert_eq!(scoped.type_name(), "User::Relation");
        let relation = scoped.downcast_ref::<Relation>().unwrap();
        assert_eq!(relation.model(), "User");
        assert_eq!(relation.count().unwrap(), 1);

        let chained = users.all().invoke("count", &[]).unwrap();
        assert_eq!(chained.type_name(), "User::Relation");
    }

    #[test]
    fn test_tables_share_connection() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("warehouse.db");

        let users = Table::new(db::open(&path).unwrap(), "User", "users").unwrap();
        db::execute_batch(
            users.db(),
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO users (name) VALUES ('Erin');",
        )
        .unwrap();

        let reopened = Table::new(db::open(&path).unwrap(), "User", "users").unwrap();
        assert_eq!(reopened.find(1).unwrap().get("name"), Some(&Value::from("Erin")));
        assert_eq!(reopened.model(), "User");
    }

    #[test]
    fn test_build_is_unsaved() {
        let row = users().build([("name", "Dave")]);
        assert_eq!(row.id(), None);
        assert_eq!(row.get("name"), Some(&Value::from("Dave")));
    }
}
