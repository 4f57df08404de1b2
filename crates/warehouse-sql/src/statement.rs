//! INSERT, UPDATE and DELETE builders used by [`crate::Row`].

use rusqlite::types::Value as SqlValue;

use crate::{
    db::{self, Db},
    error::Result,
    expr::Condition,
    traits::Expression,
};

pub struct InsertStatement {
    db: Db,
    table: String,
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl InsertStatement {
    pub fn into(db: Db, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            columns: vec![],
            values: vec![],
        }
    }

    pub fn set(mut self, column: &str, value: SqlValue) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value);
        self
    }

    /// Runs the insert and returns the new rowid.
    pub fn execute(self) -> Result<i64> {
        let (sql, params) = self.build_sql();
        db::insert(&self.db, &sql, &params)
    }

    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        if self.columns.is_empty() {
            return (format!("INSERT INTO {} DEFAULT VALUES", self.table), vec![]);
        }

        let columns = self.columns.join(", ");
        let placeholders = vec!["?"; self.values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table, columns, placeholders
        );

        (sql, self.values.clone())
    }
}

pub struct UpdateStatement {
    db: Db,
    table: String,
    updates: Vec<(String, SqlValue)>,
    wheres: Vec<Condition>,
}

impl UpdateStatement {
    pub fn table(db: Db, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            updates: vec![],
            wheres: vec![],
        }
    }

    pub fn set(mut self, column: &str, value: SqlValue) -> Self {
        self.updates.push((column.to_string(), value));
        self
    }

    pub fn filter<E: Expression>(mut self, expr: E) -> Self {
        self.wheres.push(Condition::new(&expr));
        self
    }

    /// Runs the update and returns the number of changed rows.
    pub fn execute(self) -> Result<usize> {
        if self.updates.is_empty() {
            return Ok(0);
        }
        let (sql, params) = self.build_sql();
        db::execute(&self.db, &sql, &params)
    }

    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();

        let sets: Vec<String> = self
            .updates
            .iter()
            .map(|(col, val)| {
                params.push(val.clone());
                format!("{} = ?", col)
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));
        push_wheres(&mut sql, &mut params, &self.wheres);

        (sql, params)
    }
}

pub struct DeleteStatement {
    db: Db,
    table: String,
    wheres: Vec<Condition>,
}

impl DeleteStatement {
    pub fn from(db: Db, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            wheres: Vec::new(),
        }
    }

    pub fn filter<E: Expression>(mut self, expr: E) -> Self {
        self.wheres.push(Condition::new(&expr));
        self
    }

    pub fn execute(self) -> Result<usize> {
        let (sql, params) = self.build_sql();
        db::execute(&self.db, &sql, &params)
    }

    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);
        push_wheres(&mut sql, &mut params, &self.wheres);
        (sql, params)
    }
}

/// Appends ` WHERE a AND b ...` for `wheres`, if any.
pub(crate) fn push_wheres(sql: &mut String, params: &mut Vec<SqlValue>, wheres: &[Condition]) {
    if wheres.is_empty() {
        return;
    }
    let conditions: Vec<String> = wheres.iter().map(|w| w.to_sql(params)).collect();
    sql.push_str(" WHERE ");
    sql.push_str(&conditions.join(" AND "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::open_in_memory, define_columns, expr::Col};

    define_columns!(
        notes {
            table: "notes",
            columns: {
                ID: i64 => "id",
                BODY: String => "body",
            }
        }
    );

    fn setup_db() -> Db {
        let db = open_in_memory().unwrap();
        db::execute_batch(
            &db,
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)",
        )
        .unwrap();
        db
    }

    fn bodies(db: &Db) -> Vec<Option<String>> {
        let conn = db.lock().unwrap();
        let mut stmt = conn.prepare("SELECT body FROM notes ORDER BY id").unwrap();
        let bodies = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        bodies
    }

    #[test]
    fn test_insert() {
        let db = setup_db();

        let first = InsertStatement::into(db.clone(), notes::TABLE)
            .set(notes::BODY.name(), "hello".to_string().into())
            .execute()
            .unwrap();
        let second = InsertStatement::into(db.clone(), notes::TABLE)
            .execute()
            .unwrap();

        assert_eq!(second, first + 1);
        assert_eq!(bodies(&db), vec![Some("hello".to_string()), None]);
    }

    #[test]
    fn test_update_and_delete() {
        let db = setup_db();
        let id = InsertStatement::into(db.clone(), notes::TABLE)
            .set("body", SqlValue::Text("draft".into()))
            .execute()
            .unwrap();

        let changed = UpdateStatement::table(db.clone(), notes::TABLE)
            .set("body", SqlValue::Text("final".into()))
            .filter(notes::ID.eq(id))
            .execute()
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(bodies(&db), vec![Some("final".to_string())]);

        let missing = UpdateStatement::table(db.clone(), notes::TABLE)
            .set("body", SqlValue::Null)
            .filter(notes::ID.eq(id + 1))
            .execute()
            .unwrap();
        assert_eq!(missing, 0);

        let deleted = DeleteStatement::from(db.clone(), notes::TABLE)
            .filter(Col::<i64>::new("id").eq(id))
            .execute()
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(bodies(&db).is_empty());
    }
}
