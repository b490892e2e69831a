//! Idempotency ledger backed by the `idempotency_keys` table.

use async_trait::async_trait;
use diesel::prelude::*;

use correspondence_core::errors::{DatabaseError, Error, Result};
use correspondence_core::idempotency::{ClaimOutcome, IdempotencyKey, IdempotencyStore};

use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::schema::idempotency_keys;

use super::model::IdempotencyKeyDB;

pub struct SqliteIdempotencyStore {
    writer: WriteHandle,
}

impl SqliteIdempotencyStore {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl IdempotencyStore for SqliteIdempotencyStore {
    /// The insert is the compare-and-swap: a unique violation on the derived
    /// id means another caller holds the claim, which is an outcome rather
    /// than an error.
    async fn try_claim(&self, key: &IdempotencyKey) -> Result<ClaimOutcome> {
        let row = IdempotencyKeyDB::try_from(key)?;
        let result = self
            .writer
            .exec(move |conn| {
                diesel::insert_into(idempotency_keys::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(ClaimOutcome::Claimed),
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                Ok(ClaimOutcome::AlreadyClaimed)
            }
            Err(err) => Err(err),
        }
    }
}
