//! Correspondence repository and the transactional replay executor.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use correspondence_core::correspondence::SyncView;
use correspondence_core::errors::{Error, Result};
use correspondence_core::events::{ForwardingEvent, NotificationEvent};
use correspondence_core::notification::NotificationStore;
use correspondence_core::sync::{
    dedup_delete_events, dedup_forwarding_events, dedup_status_events, merge_chronological,
    plan_replay, AttachmentPurger, CorrespondenceStore, SideEffectJob, SyncBatch,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::outbox::enqueue_job;
use crate::schema::{
    correspondence_delete_events, correspondence_forwarding_events, correspondence_notifications,
    correspondence_statuses, correspondences,
};

use super::model::{
    view_from_rows, CorrespondenceDB, DeleteEventDB, ForwardingEventDB, NewStatusEventDB,
    NotificationEventDB, StatusEventDB,
};

/// Bounded retry for transient conflicts (busy database, serialization).
const REPLAY_RETRIES: u32 = 10;
const REPLAY_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Runs one sync write per attempt, retrying transient conflicts with a short
/// fixed delay. Guard violations, not-found and other fatal errors surface
/// immediately.
async fn with_transient_retry<T, F, Fut>(correspondence_id: Uuid, attempt: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut tries = 0;
    loop {
        match attempt().await {
            Err(err) if err.is_transient() && tries < REPLAY_RETRIES => {
                tries += 1;
                log::warn!(
                    "Transient conflict while syncing correspondence {} (attempt {}): {}",
                    correspondence_id,
                    tries,
                    err
                );
                tokio::time::sleep(REPLAY_RETRY_DELAY).await;
            }
            other => return other,
        }
    }
}

pub struct SqliteCorrespondenceStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    purger: Arc<dyn AttachmentPurger>,
}

impl SqliteCorrespondenceStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, purger: Arc<dyn AttachmentPurger>) -> Self {
        Self {
            pool,
            writer,
            purger,
        }
    }

    /// Persists a correspondence with whatever event collections the view
    /// carries. Used by the migration intake path and by tests.
    pub async fn insert_correspondence(&self, view: &SyncView) -> Result<()> {
        let row = CorrespondenceDB::from(view);
        let statuses = view
            .statuses
            .iter()
            .map(NewStatusEventDB::try_from)
            .collect::<Result<Vec<_>>>()?;
        let delete_events = view
            .delete_events
            .iter()
            .map(DeleteEventDB::try_from)
            .collect::<Result<Vec<_>>>()?;
        let forwarding_events = view
            .forwarding_events
            .iter()
            .map(ForwardingEventDB::from)
            .collect::<Vec<_>>();

        self.writer
            .exec(move |conn| {
                diesel::insert_into(correspondences::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                for status in &statuses {
                    diesel::insert_into(correspondence_statuses::table)
                        .values(status)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                for event in &delete_events {
                    diesel::insert_into(correspondence_delete_events::table)
                        .values(event)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                for event in &forwarding_events {
                    diesel::insert_into(correspondence_forwarding_events::table)
                        .values(event)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}

pub(crate) fn load_view(conn: &mut SqliteConnection, id: Uuid) -> Result<SyncView> {
    let key = id.to_string();
    let row = correspondences::table
        .find(&key)
        .first::<CorrespondenceDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or(Error::NotFound)?;

    let statuses = correspondence_statuses::table
        .filter(correspondence_statuses::correspondence_id.eq(&key))
        .order(correspondence_statuses::seq.asc())
        .load::<StatusEventDB>(conn)
        .map_err(StorageError::from)?;
    let delete_events = correspondence_delete_events::table
        .filter(correspondence_delete_events::correspondence_id.eq(&key))
        .order(correspondence_delete_events::event_occurred.asc())
        .load::<DeleteEventDB>(conn)
        .map_err(StorageError::from)?;
    let forwarding_events = correspondence_forwarding_events::table
        .filter(correspondence_forwarding_events::correspondence_id.eq(&key))
        .order(correspondence_forwarding_events::forwarded_on.asc())
        .load::<ForwardingEventDB>(conn)
        .map_err(StorageError::from)?;

    view_from_rows(row, statuses, delete_events, forwarding_events)
}

/// One replay attempt. Runs inside the write actor's immediate transaction:
/// re-fetches fresh state, re-deduplicates the batch against it, plans the
/// replay and applies the whole plan. Any error rolls everything back,
/// including the enqueued jobs.
fn apply_sync_batch_tx(
    conn: &mut SqliteConnection,
    correspondence_id: Uuid,
    batch: &SyncBatch,
    purger: &dyn AttachmentPurger,
) -> Result<()> {
    let view = load_view(conn, correspondence_id)?;
    if view.is_purged() {
        return Err(Error::NotFound);
    }

    let status_events = dedup_status_events(view.id, &view.statuses, &batch.status_events);
    let delete_events = dedup_delete_events(view.id, &view.delete_events, &batch.delete_events);
    let merged = merge_chronological(status_events, delete_events);
    if merged.is_empty() {
        // A concurrent sync applied the same events first.
        log::info!(
            "Replay batch for correspondence {} was fully absorbed by current state",
            view.id
        );
        return Ok(());
    }

    let plan = plan_replay(&view, merged, Utc::now())?;
    for row in &plan.status_rows {
        diesel::insert_into(correspondence_statuses::table)
            .values(NewStatusEventDB::try_from(row)?)
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    for row in &plan.delete_rows {
        diesel::insert_into(correspondence_delete_events::table)
            .values(DeleteEventDB::try_from(row)?)
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    for purge in &plan.purges {
        purger.check_and_purge_attachments(view.id, purge.party_uuid)?;
    }
    for job in &plan.jobs {
        enqueue_job(conn, job)?;
    }
    Ok(())
}

/// One forwarding append attempt. Re-deduplicates against the persisted
/// forwarding events inside the transaction and enqueues one activity job per
/// surviving event unless the correspondence is migrating.
fn append_forwarding_events_tx(
    conn: &mut SqliteConnection,
    correspondence_id: Uuid,
    events: Vec<ForwardingEvent>,
) -> Result<()> {
    let view = load_view(conn, correspondence_id)?;
    let survivors = dedup_forwarding_events(view.id, &view.forwarding_events, &events);
    if survivors.is_empty() {
        return Ok(());
    }

    let synced_at = Utc::now();
    for mut event in survivors {
        event.synced_from_legacy_at = Some(synced_at);
        diesel::insert_into(correspondence_forwarding_events::table)
            .values(ForwardingEventDB::from(&event))
            .execute(conn)
            .map_err(StorageError::from)?;
        if !view.is_migrating {
            enqueue_job(
                conn,
                &SideEffectJob::ReportForwarding {
                    correspondence_id: view.id,
                    party_uuid: event.forwarded_by_party,
                    occurred: event.forwarded_on,
                },
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl CorrespondenceStore for SqliteCorrespondenceStore {
    async fn get_for_sync(&self, id: Uuid) -> Result<SyncView> {
        let mut conn = get_connection(&self.pool)?;
        load_view(&mut conn, id)
    }

    async fn apply_sync_batch(&self, correspondence_id: Uuid, batch: SyncBatch) -> Result<()> {
        with_transient_retry(correspondence_id, || {
            let batch = batch.clone();
            let purger = self.purger.clone();
            async move {
                self.writer
                    .exec(move |conn| {
                        apply_sync_batch_tx(conn, correspondence_id, &batch, purger.as_ref())
                    })
                    .await
            }
        })
        .await
    }

    async fn append_forwarding_events(
        &self,
        correspondence_id: Uuid,
        events: Vec<ForwardingEvent>,
    ) -> Result<()> {
        with_transient_retry(correspondence_id, || {
            let events = events.clone();
            async move {
                self.writer
                    .exec(move |conn| append_forwarding_events_tx(conn, correspondence_id, events))
                    .await
            }
        })
        .await
    }
}

pub struct SqliteNotificationStore {
    writer: WriteHandle,
}

impl SqliteNotificationStore {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn insert_notification(&self, event: NotificationEvent) -> Result<()> {
        let row = NotificationEventDB::from(&event);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(correspondence_notifications::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use diesel::dsl::count_star;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use correspondence_core::correspondence::CorrespondenceStatus;
    use correspondence_core::events::{DeleteEvent, DeleteEventType, StatusEvent};
    use correspondence_core::sync::{OutboxQueue, SyncEngine, SyncRequest};

    use crate::correspondence::model::enum_to_db;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use crate::outbox::SqliteOutboxQueue;

    #[derive(Default)]
    struct RecordingPurger {
        calls: Mutex<Vec<Uuid>>,
        fail: bool,
    }

    impl AttachmentPurger for RecordingPurger {
        fn check_and_purge_attachments(
            &self,
            _correspondence_id: Uuid,
            acting_party: Uuid,
        ) -> Result<()> {
            if self.fail {
                return Err(Error::Unexpected("attachment purge failed".to_string()));
            }
            self.calls.lock().unwrap().push(acting_party);
            Ok(())
        }
    }

    fn setup_store(
        purger: Arc<RecordingPurger>,
    ) -> (Arc<DbPool>, WriteHandle, SqliteCorrespondenceStore) {
        let app_data = tempdir()
            .expect("tempdir")
            .keep()
            .to_string_lossy()
            .to_string();
        let db_path = init(&app_data).expect("init db");
        run_migrations(&db_path).expect("migrate db");
        let pool = create_pool(&db_path).expect("create pool");
        let writer = spawn_writer(pool.as_ref().clone());
        let store = SqliteCorrespondenceStore::new(pool.clone(), writer.clone(), purger);
        (pool, writer, store)
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    fn status_event(
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
        ts: DateTime<Utc>,
    ) -> StatusEvent {
        StatusEvent {
            id: Uuid::new_v4(),
            correspondence_id,
            status,
            status_text: status.to_string(),
            status_changed: ts,
            party_uuid: Uuid::new_v4(),
            synced_from_legacy_at: None,
        }
    }

    fn seeded_view(statuses: &[(CorrespondenceStatus, DateTime<Utc>)]) -> SyncView {
        let id = Uuid::new_v4();
        SyncView {
            id,
            resource_id: "resource-1".to_string(),
            sender: "0192:910753614".to_string(),
            recipient: "0192:986252932".to_string(),
            created: at(7, 0),
            requested_publish_time: None,
            due_date_time: None,
            allow_system_delete_after: None,
            is_confirmation_needed: false,
            is_migrating: false,
            statuses: statuses
                .iter()
                .map(|(status, ts)| status_event(id, *status, *ts))
                .collect(),
            delete_events: Vec::new(),
            forwarding_events: Vec::new(),
        }
    }

    fn count_status_rows(
        pool: &Arc<DbPool>,
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
    ) -> i64 {
        let mut conn = get_connection(pool).expect("conn");
        correspondence_statuses::table
            .filter(correspondence_statuses::correspondence_id.eq(correspondence_id.to_string()))
            .filter(correspondence_statuses::status.eq(enum_to_db(&status).expect("status")))
            .select(count_star())
            .first(&mut conn)
            .expect("count")
    }

    fn count_outbox_rows(pool: &Arc<DbPool>) -> i64 {
        let mut conn = get_connection(pool).expect("conn");
        crate::schema::sync_outbox::table
            .select(count_star())
            .first(&mut conn)
            .expect("count")
    }

    #[tokio::test]
    async fn missing_correspondence_is_not_found() {
        let (_pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        assert!(matches!(
            store.get_for_sync(Uuid::new_v4()).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn replaying_the_same_batch_twice_is_idempotent() {
        let (pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[
            (CorrespondenceStatus::Published, at(7, 30)),
            (CorrespondenceStatus::Fetched, at(7, 45)),
        ]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: vec![status_event(view.id, CorrespondenceStatus::Read, at(8, 0))],
            delete_events: Vec::new(),
        };
        store.apply_sync_batch(view.id, batch.clone()).await.unwrap();
        store.apply_sync_batch(view.id, batch).await.unwrap();

        assert_eq!(
            count_status_rows(&pool, view.id, CorrespondenceStatus::Read),
            1
        );
    }

    #[tokio::test]
    async fn scrambled_batch_is_persisted_in_timestamp_order() {
        let (_pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[
            (CorrespondenceStatus::Published, at(7, 30)),
            (CorrespondenceStatus::Fetched, at(7, 45)),
        ]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: vec![
                status_event(view.id, CorrespondenceStatus::Archived, at(10, 0)),
                status_event(view.id, CorrespondenceStatus::Read, at(8, 0)),
                status_event(view.id, CorrespondenceStatus::Confirmed, at(9, 0)),
            ],
            delete_events: Vec::new(),
        };
        store.apply_sync_batch(view.id, batch).await.unwrap();

        let synced = store.get_for_sync(view.id).await.unwrap();
        let appended: Vec<CorrespondenceStatus> = synced
            .statuses
            .iter()
            .filter(|event| event.synced_from_legacy_at.is_some())
            .map(|event| event.status)
            .collect();
        assert_eq!(
            appended,
            vec![
                CorrespondenceStatus::Read,
                CorrespondenceStatus::Confirmed,
                CorrespondenceStatus::Archived,
            ]
        );
    }

    #[tokio::test]
    async fn guard_violation_rolls_back_the_whole_batch() {
        let (pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[(CorrespondenceStatus::Published, at(7, 30))]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: vec![status_event(view.id, CorrespondenceStatus::Read, at(8, 0))],
            delete_events: Vec::new(),
        };
        assert!(matches!(
            store.apply_sync_batch(view.id, batch).await,
            Err(Error::Guard(_))
        ));

        assert_eq!(
            count_status_rows(&pool, view.id, CorrespondenceStatus::Read),
            0
        );
        assert_eq!(count_outbox_rows(&pool), 0);
    }

    #[tokio::test]
    async fn purged_correspondence_rejects_further_replay() {
        let (pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[
            (CorrespondenceStatus::Fetched, at(7, 30)),
            (CorrespondenceStatus::PurgedByAltinn, at(7, 45)),
        ]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: vec![status_event(view.id, CorrespondenceStatus::Read, at(8, 0))],
            delete_events: Vec::new(),
        };
        assert!(matches!(
            store.apply_sync_batch(view.id, batch).await,
            Err(Error::NotFound)
        ));
        assert_eq!(
            count_status_rows(&pool, view.id, CorrespondenceStatus::Read),
            0
        );
    }

    #[tokio::test]
    async fn hard_delete_purges_attachments_and_appends_purge_status() {
        let purger = Arc::new(RecordingPurger::default());
        let (pool, _writer, store) = setup_store(purger.clone());
        let view = seeded_view(&[(CorrespondenceStatus::Fetched, at(7, 30))]);
        store.insert_correspondence(&view).await.unwrap();

        let party = Uuid::new_v4();
        let batch = SyncBatch {
            status_events: Vec::new(),
            delete_events: vec![DeleteEvent {
                id: Uuid::new_v4(),
                correspondence_id: view.id,
                event_type: DeleteEventType::HardDeletedByRecipient,
                event_occurred: at(8, 0),
                party_uuid: party,
                synced_from_legacy_at: None,
            }],
        };
        store.apply_sync_batch(view.id, batch).await.unwrap();

        assert_eq!(*purger.calls.lock().unwrap(), vec![party]);
        assert_eq!(
            count_status_rows(&pool, view.id, CorrespondenceStatus::PurgedByRecipient),
            1
        );
        let synced = store.get_for_sync(view.id).await.unwrap();
        assert_eq!(synced.delete_events.len(), 1);
        assert!(count_outbox_rows(&pool) > 0);
    }

    #[tokio::test]
    async fn failing_attachment_purge_rolls_back_everything() {
        let purger = Arc::new(RecordingPurger {
            calls: Mutex::new(Vec::new()),
            fail: true,
        });
        let (pool, _writer, store) = setup_store(purger);
        let view = seeded_view(&[(CorrespondenceStatus::Fetched, at(7, 30))]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: Vec::new(),
            delete_events: vec![DeleteEvent {
                id: Uuid::new_v4(),
                correspondence_id: view.id,
                event_type: DeleteEventType::HardDeletedByRecipient,
                event_occurred: at(8, 0),
                party_uuid: Uuid::new_v4(),
                synced_from_legacy_at: None,
            }],
        };
        assert!(store.apply_sync_batch(view.id, batch).await.is_err());

        let synced = store.get_for_sync(view.id).await.unwrap();
        assert!(synced.delete_events.is_empty());
        assert!(!synced.is_purged());
        assert_eq!(count_outbox_rows(&pool), 0);
    }

    #[tokio::test]
    async fn committed_replay_jobs_are_drainable() {
        let purger = Arc::new(RecordingPurger::default());
        let (pool, writer, store) = setup_store(purger);
        let view = seeded_view(&[
            (CorrespondenceStatus::Published, at(7, 30)),
            (CorrespondenceStatus::Fetched, at(7, 45)),
        ]);
        store.insert_correspondence(&view).await.unwrap();

        let batch = SyncBatch {
            status_events: vec![status_event(view.id, CorrespondenceStatus::Read, at(8, 0))],
            delete_events: Vec::new(),
        };
        store.apply_sync_batch(view.id, batch).await.unwrap();

        let queue = SqliteOutboxQueue::new(pool, writer);
        let pending = queue.list_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending
            .iter()
            .any(|row| matches!(row.job, SideEffectJob::PublishDomainEvent { .. })));
        assert!(pending
            .iter()
            .any(|row| matches!(row.job, SideEffectJob::ReportActivity { .. })));
    }

    #[tokio::test]
    async fn forwarding_duplicates_collapse_inside_the_transaction() {
        let (pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[(CorrespondenceStatus::Fetched, at(7, 30))]);
        store.insert_correspondence(&view).await.unwrap();

        let event = ForwardingEvent {
            id: Uuid::new_v4(),
            correspondence_id: view.id,
            forwarded_on: at(8, 0),
            forwarded_by_party: Uuid::new_v4(),
            forwarded_by_user: None,
            forwarded_to_user: None,
            forwarded_to_email: Some("recipient@example.com".to_string()),
            forwarding_text: Some("please handle".to_string()),
            mailbox_supplier: None,
            synced_from_legacy_at: None,
        };
        let mut resent = event.clone();
        resent.id = Uuid::new_v4();

        store
            .append_forwarding_events(view.id, vec![event.clone()])
            .await
            .unwrap();
        store
            .append_forwarding_events(view.id, vec![resent])
            .await
            .unwrap();

        let synced = store.get_for_sync(view.id).await.unwrap();
        assert_eq!(synced.forwarding_events.len(), 1);
        assert_eq!(count_outbox_rows(&pool), 1);
    }

    #[tokio::test]
    async fn transient_conflicts_retry_until_the_attempt_succeeds() {
        use correspondence_core::errors::DatabaseError;
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let value = with_transient_retry(Uuid::new_v4(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(Error::Database(DatabaseError::Transient(
                        "database is locked".to_string(),
                    )))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn fatal_errors_surface_without_retrying() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_transient_retry(Uuid::new_v4(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::NotFound) }
        })
        .await;

        assert!(matches!(result, Err(Error::NotFound)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_transient_budget_surfaces_the_last_error() {
        use correspondence_core::errors::DatabaseError;
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_transient_retry(Uuid::new_v4(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(Error::Database(DatabaseError::Transient(
                    "database table is locked".to_string(),
                )))
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::Transient(_)))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), REPLAY_RETRIES + 1);
    }

    #[tokio::test]
    async fn engine_end_to_end_over_sqlite() {
        let (_pool, _writer, store) = setup_store(Arc::new(RecordingPurger::default()));
        let view = seeded_view(&[
            (CorrespondenceStatus::Published, at(7, 30)),
            (CorrespondenceStatus::Fetched, at(7, 45)),
        ]);
        store.insert_correspondence(&view).await.unwrap();
        let engine = SyncEngine::new(Arc::new(store));

        let request = SyncRequest {
            correspondence_id: view.id,
            status_events: vec![
                status_event(view.id, CorrespondenceStatus::Confirmed, at(9, 0)),
                status_event(view.id, CorrespondenceStatus::Read, at(8, 0)),
            ],
            delete_events: Vec::new(),
            forwarding_events: Vec::new(),
        };
        let id = engine.sync_correspondence_events(request.clone()).await.unwrap();
        assert_eq!(id, view.id);

        // Resubmitting the same window is a logged no-op.
        engine.sync_correspondence_events(request).await.unwrap();
    }
}
