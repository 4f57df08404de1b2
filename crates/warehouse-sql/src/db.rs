//! Shared connection handle and statement execution.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{types::Value as SqlValue, Connection, ToSql};
use tracing::trace;

use crate::error::{Result, SqlError};

/// A connection shared by every table, relation and row built on it.
pub type Db = Arc<Mutex<Connection>>;

pub fn open<P: AsRef<Path>>(path: P) -> Result<Db> {
    let conn = Connection::open(path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<Db> {
    let conn = Connection::open_in_memory()?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn lock(db: &Db) -> Result<MutexGuard<'_, Connection>> {
    db.lock().map_err(|_| SqlError::Poisoned)
}

/// Runs one or more `;`-separated statements without parameters.
pub fn execute_batch(db: &Db, sql: &str) -> Result<()> {
    trace!(sql = %sql, "executing batch");
    lock(db)?.execute_batch(sql)?;
    Ok(())
}

/// Runs a single statement, returning the number of changed rows.
pub(crate) fn execute(db: &Db, sql: &str, params: &[SqlValue]) -> Result<usize> {
    trace!(sql = %sql, params = params.len(), "executing statement");
    let conn = lock(db)?;
    let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
    Ok(conn.execute(sql, params_ref.as_slice())?)
}

/// Like [`execute`], returning the rowid of the inserted row.
pub(crate) fn insert(db: &Db, sql: &str, params: &[SqlValue]) -> Result<i64> {
    trace!(sql = %sql, params = params.len(), "executing insert");
    let conn = lock(db)?;
    let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
    conn.execute(sql, params_ref.as_slice())?;
    Ok(conn.last_insert_rowid())
}
