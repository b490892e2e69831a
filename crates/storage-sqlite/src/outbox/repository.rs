//! Durable side-effect outbox.
//!
//! Jobs are enqueued inside the replay transaction through `enqueue_job`, so
//! they become visible exactly when the replay commits. The drain side is
//! served by `SqliteOutboxQueue`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use correspondence_core::sync::{OutboxQueue, OutboxRow, SideEffectJob};
use correspondence_core::Result;

use crate::correspondence::model::{enum_to_db, format_ts};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_outbox;

use super::model::{NewOutboxRowDB, OutboxRowDB, OutboxStatus};

/// Writes one pending job. Must be called inside the mutating transaction so
/// a rollback also discards the job.
pub fn enqueue_job(conn: &mut SqliteConnection, job: &SideEffectJob) -> Result<()> {
    let row = NewOutboxRowDB {
        job: serde_json::to_string(job)?,
        status: enum_to_db(&OutboxStatus::Pending)?,
        retry_count: 0,
        next_retry_at: None,
        last_error: None,
        created_at: format_ts(Utc::now()),
    };
    diesel::insert_into(sync_outbox::table)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

pub struct SqliteOutboxQueue {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteOutboxQueue {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl OutboxQueue for SqliteOutboxQueue {
    async fn list_pending(&self, limit: i64) -> Result<Vec<OutboxRow>> {
        let mut conn = get_connection(&self.pool)?;
        let now = format_ts(Utc::now());
        let rows = sync_outbox::table
            .filter(sync_outbox::status.eq(enum_to_db(&OutboxStatus::Pending)?))
            .filter(
                sync_outbox::next_retry_at
                    .is_null()
                    .or(sync_outbox::next_retry_at.le(now)),
            )
            .order(sync_outbox::id.asc())
            .limit(limit)
            .load::<OutboxRowDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| {
                Ok(OutboxRow {
                    id: row.id,
                    job: serde_json::from_str(&row.job)?,
                    retry_count: row.retry_count,
                })
            })
            .collect()
    }

    async fn mark_sent(&self, ids: &[i64]) -> Result<()> {
        let ids = ids.to_vec();
        self.writer
            .exec(move |conn| {
                diesel::update(sync_outbox::table.filter(sync_outbox::id.eq_any(&ids)))
                    .set(sync_outbox::status.eq(enum_to_db(&OutboxStatus::Sent)?))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn schedule_retry(&self, id: i64, backoff_secs: i64, error: &str) -> Result<()> {
        let error = error.to_string();
        self.writer
            .exec(move |conn| {
                let next = format_ts(Utc::now() + Duration::seconds(backoff_secs));
                diesel::update(sync_outbox::table.find(id))
                    .set((
                        sync_outbox::retry_count.eq(sync_outbox::retry_count + 1),
                        sync_outbox::next_retry_at.eq(Some(next)),
                        sync_outbox::last_error.eq(Some(error)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn mark_dead(&self, id: i64, error: &str) -> Result<()> {
        let error = error.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(sync_outbox::table.find(id))
                    .set((
                        sync_outbox::status.eq(enum_to_db(&OutboxStatus::Dead)?),
                        sync_outbox::last_error.eq(Some(error)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
