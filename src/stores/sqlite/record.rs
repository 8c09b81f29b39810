//! Implements a SQLite backed record store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::types::Type;
use rust_decimal::Decimal;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    record::{CategoryName, FinancialRecord, NewRecord, RecordId, RecordKind},
    stores::RecordStore,
};

/// Create, retrieve and delete financial records.
#[derive(Debug, Clone)]
pub struct SQLiteRecordStore {
    connection: Arc<Mutex<rusqlite::Connection>>,
}

impl SQLiteRecordStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<rusqlite::Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteRecordStore {
    fn create_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
        // Amounts are kept as text so no precision is lost to floating point.
        connection.execute(
            "CREATE TABLE IF NOT EXISTS financial_record (
                id INTEGER PRIMARY KEY,
                occurred_at TEXT NOT NULL,
                amount TEXT NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                note TEXT,
                receipt_ref TEXT
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteRecordStore {
    type ReturnType = FinancialRecord;

    fn map_row_with_offset(
        row: &rusqlite::Row,
        offset: usize,
    ) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let occurred_at = row.get(offset + 1)?;
        let amount: String = row.get(offset + 2)?;
        let amount = Decimal::from_str(&amount).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 2, Type::Text, Box::new(error))
        })?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                offset + 2,
                Type::Text,
                Box::new(Error::NegativeAmount(amount.to_string())),
            ));
        }
        let kind: String = row.get(offset + 3)?;
        let kind = RecordKind::from_str(&kind).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 3, Type::Text, Box::new(error))
        })?;
        let category: String = row.get(offset + 4)?;
        let note = row.get(offset + 5)?;
        let receipt_ref = row.get(offset + 6)?;

        Ok(FinancialRecord {
            id,
            occurred_at,
            amount,
            kind,
            category: CategoryName::new_unchecked(&category),
            note,
            receipt_ref,
        })
    }
}

impl RecordStore for SQLiteRecordStore {
    fn create(&mut self, new_record: NewRecord) -> Result<FinancialRecord, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::LockError("database"))?;

        connection.execute(
            "INSERT INTO financial_record (occurred_at, amount, kind, category, note, receipt_ref)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &new_record.occurred_at,
                new_record.amount.to_string(),
                new_record.kind.as_str(),
                new_record.category.to_string(),
                &new_record.note,
                &new_record.receipt_ref,
            ),
        )?;

        let id = connection.last_insert_rowid();
        tracing::debug!("created {} record {id}", new_record.kind);

        Ok(FinancialRecord {
            id,
            occurred_at: new_record.occurred_at,
            amount: new_record.amount,
            kind: new_record.kind,
            category: new_record.category,
            note: new_record.note,
            receipt_ref: new_record.receipt_ref,
        })
    }

    fn get_all(&self) -> Result<Vec<FinancialRecord>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::LockError("database"))?
            .prepare(
                "SELECT id, occurred_at, amount, kind, category, note, receipt_ref
                FROM financial_record;",
            )?
            .query_map([], SQLiteRecordStore::map_row)?
            .map(|maybe_record| maybe_record.map_err(|error| error.into()))
            .collect()
    }

    fn delete(&mut self, id: RecordId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::LockError("database"))?
            .execute("DELETE FROM financial_record WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingRecord);
        }

        Ok(())
    }
}
