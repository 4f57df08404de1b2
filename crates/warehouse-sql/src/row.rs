//! Records: one row of a model's table.

use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

use rusqlite::types::Value as SqlValue;
use tracing::debug;
use warehouse_core::{
    domain::{unsupported, DomainObject},
    Record, Value,
};

use crate::{
    convert::{from_sql, identifier, to_sql},
    error::{Result, SqlError},
    expr::Col,
    relation::Relation,
    statement::{DeleteStatement, InsertStatement, UpdateStatement},
    table::Schema,
    traits::Expression,
};

const ID: Col<i64> = Col::new("id");

/// A record of a model. Its type name is the model name.
///
/// A row without an `id` has never been saved. Attribute reads are
/// answered as domain operations, so a row can also travel through a
/// repository as a [`Value::Object`].
#[derive(Clone)]
pub struct Row {
    schema: Arc<Schema>,
    id: Option<i64>,
    attributes: BTreeMap<String, Value>,
    destroyed: bool,
}

impl Row {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            id: None,
            attributes: BTreeMap::new(),
            destroyed: false,
        }
    }

    pub(crate) fn loaded(schema: Arc<Schema>, values: Vec<(String, SqlValue)>) -> Self {
        let mut row = Self::new(schema);
        row.assign(values);
        row
    }

    fn assign(&mut self, values: Vec<(String, SqlValue)>) {
        self.attributes.clear();
        for (name, value) in values {
            match (name.as_str(), value) {
                ("id", SqlValue::Integer(id)) => self.id = Some(id),
                (_, value) => {
                    self.attributes.insert(name, from_sql(value));
                }
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.schema.model
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Re-reads every attribute from the database.
    pub fn reload(&mut self) -> Result<()> {
        let id = self
            .id
            .ok_or_else(|| SqlError::NotPersisted(self.schema.model.clone()))?;

        let fresh = Relation::new(Arc::clone(&self.schema))
            .filter(ID.eq(id))
            .first()?
            .ok_or_else(|| SqlError::RecordNotFound {
                model: self.schema.model.clone(),
                id,
            })?;

        self.attributes = fresh.attributes;
        Ok(())
    }

    /// Reads `name, value` pairs from `extra` without assigning any of them.
    fn extra_pairs(extra: &[Value]) -> warehouse_core::Result<Vec<(String, Value)>> {
        if extra.len() % 2 != 0 {
            return Err(warehouse_core::WarehouseError::InvalidArgument {
                operation: "save".to_string(),
                reason: "expected attribute/value pairs".to_string(),
            });
        }

        let mut pairs = Vec::with_capacity(extra.len() / 2);
        for pair in extra.chunks(2) {
            let name = warehouse_core::domain::text_arg("save", pair, 0)?;
            pairs.push((name.to_string(), pair[1].clone()));
        }
        Ok(pairs)
    }

    fn columns(&self) -> Result<Vec<(&str, SqlValue)>> {
        let mut columns = Vec::with_capacity(self.attributes.len());
        for (name, value) in &self.attributes {
            columns.push((identifier(name)?, to_sql(value)?));
        }
        Ok(columns)
    }

    fn insert(&mut self) -> Result<()> {
        let mut statement = InsertStatement::into(self.schema.db.clone(), &self.schema.table);
        for (column, value) in self.columns()? {
            statement = statement.set(column, value);
        }

        let id = statement.execute()?;
        debug!(model = %self.schema.model, id, "inserted record");
        self.id = Some(id);
        Ok(())
    }

    fn update(&mut self, id: i64) -> Result<()> {
        // Nothing to write still has to prove the row is there.
        let changed = if self.attributes.is_empty() {
            Relation::new(Arc::clone(&self.schema))
                .filter(ID.eq(id))
                .count()? as usize
        } else {
            let mut statement = UpdateStatement::table(self.schema.db.clone(), &self.schema.table);
            for (column, value) in self.columns()? {
                statement = statement.set(column, value);
            }
            statement.filter(ID.eq(id)).execute()?
        };

        if changed == 0 {
            return Err(SqlError::RecordNotFound {
                model: self.schema.model.clone(),
                id,
            });
        }
        debug!(model = %self.schema.model, id, "updated record");
        Ok(())
    }
}

impl Record for Row {
    fn new_record(&self) -> bool {
        self.id.is_none()
    }

    fn persisted(&self) -> bool {
        self.id.is_some() && !self.destroyed
    }

    /// Inserts a new row or updates the stored one. `extra` holds
    /// `attribute, value` pairs assigned before saving.
    fn save(&mut self, extra: &[Value]) -> warehouse_core::Result<bool> {
        let pairs = Self::extra_pairs(extra)?;
        if self.destroyed {
            return Err(SqlError::RecordNotFound {
                model: self.schema.model.clone(),
                id: self.id.unwrap_or_default(),
            }
            .into());
        }
        for (name, value) in pairs {
            self.set(name, value);
        }

        match self.id {
            None => {
                self.insert()?;
                Ok(true)
            }
            Some(id) => {
                self.update(id)?;
                Ok(true)
            }
        }
    }

    fn destroy(&mut self) -> warehouse_core::Result<()> {
        let id = self
            .id
            .ok_or_else(|| SqlError::NotPersisted(self.schema.model.clone()))?;

        DeleteStatement::from(self.schema.db.clone(), &self.schema.table)
            .filter(ID.eq(id))
            .execute()?;

        debug!(model = %self.schema.model, id, "destroyed record");
        self.destroyed = true;
        Ok(())
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("model", &self.schema.model)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl DomainObject for Row {
    fn type_name(&self) -> String {
        self.schema.model.clone()
    }

    fn responds_to(&self, operation: &str) -> bool {
        matches!(operation, "id" | "new_record" | "persisted") || self.attributes.contains_key(operation)
    }

    fn invoke(&self, operation: &str, _args: &[Value]) -> warehouse_core::Result<Value> {
        match operation {
            "id" => Ok(self.id.into()),
            "new_record" => Ok(self.new_record().into()),
            "persisted" => Ok(self.persisted().into()),
            name => self
                .attributes
                .get(name)
                .cloned()
                .ok_or_else(|| unsupported(operation, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
