//! Defines the store for financial records.

use crate::{
    Error,
    record::{FinancialRecord, NewRecord, RecordId},
};

/// Handles the creation, retrieval and deletion of financial records.
pub trait RecordStore {
    /// Create a new record in the store.
    fn create(&mut self, new_record: NewRecord) -> Result<FinancialRecord, Error>;

    /// Retrieve every record in the store, in no particular order.
    fn get_all(&self) -> Result<Vec<FinancialRecord>, Error>;

    /// Delete the record with `id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingRecord] if there is no record with `id`.
    fn delete(&mut self, id: RecordId) -> Result<(), Error>;
}
