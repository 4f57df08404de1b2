//! Persistence helpers that act on one record at a time.
//!
//! These never touch a repository's wrapped scope and never chain. They
//! guard on the record's persistence state and otherwise hand straight over
//! to the record's own `save`/`destroy`.

use tracing::debug;

use crate::{error::Result, value::Value};

/// A single persistable record.
pub trait Record {
    /// Whether the record has not been stored yet.
    fn new_record(&self) -> bool;

    /// Whether the record is stored (and not destroyed).
    fn persisted(&self) -> bool {
        !self.new_record()
    }

    /// Stores the record, returning whether it was saved.
    fn save(&mut self, extra: &[Value]) -> Result<bool>;

    /// Removes the record from storage.
    fn destroy(&mut self) -> Result<()>;
}

/// Saves a record that is not yet persisted.
///
/// Returns `Ok(false)` without saving when the record is already persisted.
pub fn create<R: Record + ?Sized>(record: &mut R, extra: &[Value]) -> Result<bool> {
    if record.persisted() {
        debug!("create skipped: record is already persisted");
        return Ok(false);
    }

    record.save(extra)
}

/// Saves a record that is already persisted.
///
/// Returns `Ok(false)` without saving when the record is new.
pub fn update<R: Record + ?Sized>(record: &mut R, extra: &[Value]) -> Result<bool> {
    if record.new_record() {
        debug!("update skipped: record is new");
        return Ok(false);
    }

    record.save(extra)
}

/// Destroys a persisted record and hands it back.
///
/// New records are left alone and `Ok(None)` is returned.
pub fn destroy<R: Record + ?Sized>(record: &mut R) -> Result<Option<&mut R>> {
    if record.new_record() {
        debug!("destroy skipped: record is new");
        return Ok(None);
    }

    record.destroy()?;
    Ok(Some(record))
}
