//! Post-commit side-effect dispatch.
//!
//! Replay never calls outbound collaborators inline. Jobs are written to a
//! durable outbox inside the replay transaction and drained afterwards, so a
//! crash between commit and delivery is recovered by draining the outbox
//! rather than by replaying memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::correspondence::CorrespondenceStatus;
use crate::errors::Result;

/// Domain events published to the platform event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEvent {
    ReceiverRead,
    ReceiverConfirmed,
    Purged,
}

/// Dialog label mutations issued for soft delete and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAction {
    SetSoftDeleted,
    ClearSoftDeleted,
}

/// Serializable description of one outbound collaborator call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffectJob {
    ReportActivity {
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
        party_uuid: Uuid,
        occurred: DateTime<Utc>,
    },
    PublishDomainEvent {
        correspondence_id: Uuid,
        event: DomainEvent,
    },
    PatchDialog {
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
    },
    DialogLabel {
        correspondence_id: Uuid,
        action: LabelAction,
    },
    ReportForwarding {
        correspondence_id: Uuid,
        party_uuid: Uuid,
        occurred: DateTime<Utc>,
    },
}

/// One pending outbox row as handed to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRow {
    pub id: i64,
    pub job: SideEffectJob,
    pub retry_count: i32,
}

/// Durable job queue backing the dispatcher. Enqueueing happens inside the
/// replay transaction and is therefore a storage-side concern; this trait
/// covers only the drain side.
#[async_trait]
pub trait OutboxQueue: Send + Sync {
    /// Pending jobs whose `next_retry_at` has passed, oldest first.
    async fn list_pending(&self, limit: i64) -> Result<Vec<OutboxRow>>;
    async fn mark_sent(&self, ids: &[i64]) -> Result<()>;
    async fn schedule_retry(&self, id: i64, backoff_secs: i64, error: &str) -> Result<()>;
    async fn mark_dead(&self, id: i64, error: &str) -> Result<()>;
}

#[async_trait]
pub trait ActivityReporter: Send + Sync {
    async fn report_activity(
        &self,
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
        party_uuid: Uuid,
        occurred: DateTime<Utc>,
    ) -> Result<()>;

    async fn report_forwarding(
        &self,
        correspondence_id: Uuid,
        party_uuid: Uuid,
        occurred: DateTime<Utc>,
    ) -> Result<()>;
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, correspondence_id: Uuid, event: DomainEvent) -> Result<()>;
}

#[async_trait]
pub trait DialogPatcher: Send + Sync {
    async fn patch_status(
        &self,
        correspondence_id: Uuid,
        status: CorrespondenceStatus,
    ) -> Result<()>;
    async fn set_label(&self, correspondence_id: Uuid, action: LabelAction) -> Result<()>;
}

const BASE_BACKOFF_SECS: i64 = 30;
const MAX_BACKOFF_EXPONENT: i32 = 6;

/// Exponential backoff with a capped exponent: 30s, 60s, ... up to 32 minutes.
pub fn backoff_seconds(retry_count: i32) -> i64 {
    BASE_BACKOFF_SECS << retry_count.clamp(0, MAX_BACKOFF_EXPONENT)
}

/// Outcome counts for one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    pub delivered: usize,
    pub retried: usize,
    pub dead: usize,
}

/// Delivers pending outbox jobs to the outbound collaborators.
pub struct Dispatcher {
    outbox: Arc<dyn OutboxQueue>,
    activity: Arc<dyn ActivityReporter>,
    events: Arc<dyn EventBus>,
    dialogs: Arc<dyn DialogPatcher>,
    batch_limit: i64,
    max_attempts: i32,
}

impl Dispatcher {
    pub fn new(
        outbox: Arc<dyn OutboxQueue>,
        activity: Arc<dyn ActivityReporter>,
        events: Arc<dyn EventBus>,
        dialogs: Arc<dyn DialogPatcher>,
    ) -> Self {
        Self {
            outbox,
            activity,
            events,
            dialogs,
            batch_limit: 100,
            max_attempts: 8,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// One drain pass over the pending queue. Each job either completes, is
    /// rescheduled with backoff, or is dead-lettered once its attempt budget
    /// is spent. Failures never stop the pass.
    pub async fn drain_once(&self) -> Result<DrainSummary> {
        let pending = self.outbox.list_pending(self.batch_limit).await?;
        let mut summary = DrainSummary::default();
        let mut sent = Vec::new();

        for row in pending {
            match self.deliver(&row.job).await {
                Ok(()) => {
                    sent.push(row.id);
                    summary.delivered += 1;
                }
                Err(err) if row.retry_count + 1 >= self.max_attempts => {
                    log::warn!(
                        "Outbox job {} exhausted its retry budget, dead-lettering: {}",
                        row.id,
                        err
                    );
                    self.outbox.mark_dead(row.id, &err.to_string()).await?;
                    summary.dead += 1;
                }
                Err(err) => {
                    let backoff = backoff_seconds(row.retry_count);
                    log::warn!(
                        "Outbox job {} failed, retrying in {}s: {}",
                        row.id,
                        backoff,
                        err
                    );
                    self.outbox
                        .schedule_retry(row.id, backoff, &err.to_string())
                        .await?;
                    summary.retried += 1;
                }
            }
        }

        if !sent.is_empty() {
            self.outbox.mark_sent(&sent).await?;
        }
        Ok(summary)
    }

    async fn deliver(&self, job: &SideEffectJob) -> Result<()> {
        match job {
            SideEffectJob::ReportActivity {
                correspondence_id,
                status,
                party_uuid,
                occurred,
            } => {
                self.activity
                    .report_activity(*correspondence_id, *status, *party_uuid, *occurred)
                    .await
            }
            SideEffectJob::PublishDomainEvent {
                correspondence_id,
                event,
            } => self.events.publish(*correspondence_id, *event).await,
            SideEffectJob::PatchDialog {
                correspondence_id,
                status,
            } => self.dialogs.patch_status(*correspondence_id, *status).await,
            SideEffectJob::DialogLabel {
                correspondence_id,
                action,
            } => self.dialogs.set_label(*correspondence_id, *action).await,
            SideEffectJob::ReportForwarding {
                correspondence_id,
                party_uuid,
                occurred,
            } => {
                self.activity
                    .report_forwarding(*correspondence_id, *party_uuid, *occurred)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOutbox {
        rows: Mutex<Vec<OutboxRow>>,
        sent: Mutex<Vec<i64>>,
        retried: Mutex<Vec<(i64, i64)>>,
        dead: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl OutboxQueue for RecordingOutbox {
        async fn list_pending(&self, _limit: i64) -> Result<Vec<OutboxRow>> {
            Ok(self.rows.lock().unwrap().clone())
        }
        async fn mark_sent(&self, ids: &[i64]) -> Result<()> {
            self.sent.lock().unwrap().extend_from_slice(ids);
            Ok(())
        }
        async fn schedule_retry(&self, id: i64, backoff_secs: i64, _error: &str) -> Result<()> {
            self.retried.lock().unwrap().push((id, backoff_secs));
            Ok(())
        }
        async fn mark_dead(&self, id: i64, _error: &str) -> Result<()> {
            self.dead.lock().unwrap().push(id);
            Ok(())
        }
    }

    struct StubCollaborators {
        fail_activity: bool,
    }

    #[async_trait]
    impl ActivityReporter for StubCollaborators {
        async fn report_activity(
            &self,
            _correspondence_id: Uuid,
            _status: CorrespondenceStatus,
            _party_uuid: Uuid,
            _occurred: DateTime<Utc>,
        ) -> Result<()> {
            if self.fail_activity {
                Err(Error::Unexpected("activity endpoint down".into()))
            } else {
                Ok(())
            }
        }

        async fn report_forwarding(
            &self,
            _correspondence_id: Uuid,
            _party_uuid: Uuid,
            _occurred: DateTime<Utc>,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl EventBus for StubCollaborators {
        async fn publish(&self, _correspondence_id: Uuid, _event: DomainEvent) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DialogPatcher for StubCollaborators {
        async fn patch_status(
            &self,
            _correspondence_id: Uuid,
            _status: CorrespondenceStatus,
        ) -> Result<()> {
            Ok(())
        }
        async fn set_label(&self, _correspondence_id: Uuid, _action: LabelAction) -> Result<()> {
            Ok(())
        }
    }

    fn activity_row(id: i64, retry_count: i32) -> OutboxRow {
        OutboxRow {
            id,
            retry_count,
            job: SideEffectJob::ReportActivity {
                correspondence_id: Uuid::new_v4(),
                status: CorrespondenceStatus::Read,
                party_uuid: Uuid::new_v4(),
                occurred: Utc::now(),
            },
        }
    }

    fn dispatcher(outbox: Arc<RecordingOutbox>, fail_activity: bool) -> Dispatcher {
        let collaborators = Arc::new(StubCollaborators { fail_activity });
        Dispatcher::new(
            outbox,
            collaborators.clone(),
            collaborators.clone(),
            collaborators,
        )
    }

    #[tokio::test]
    async fn delivered_jobs_are_marked_sent() {
        let outbox = Arc::new(RecordingOutbox::default());
        outbox.rows.lock().unwrap().push(activity_row(1, 0));
        outbox.rows.lock().unwrap().push(OutboxRow {
            id: 2,
            retry_count: 0,
            job: SideEffectJob::PublishDomainEvent {
                correspondence_id: Uuid::new_v4(),
                event: DomainEvent::ReceiverConfirmed,
            },
        });

        let summary = dispatcher(outbox.clone(), false).drain_once().await.unwrap();
        assert_eq!(summary.delivered, 2);
        assert_eq!(*outbox.sent.lock().unwrap(), vec![1, 2]);
        assert!(outbox.retried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_job_is_rescheduled_with_backoff() {
        let outbox = Arc::new(RecordingOutbox::default());
        outbox.rows.lock().unwrap().push(activity_row(7, 2));

        let summary = dispatcher(outbox.clone(), true).drain_once().await.unwrap();
        assert_eq!(summary.retried, 1);
        assert_eq!(*outbox.retried.lock().unwrap(), vec![(7, 120)]);
        assert!(outbox.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_retry_budget_dead_letters() {
        let outbox = Arc::new(RecordingOutbox::default());
        outbox.rows.lock().unwrap().push(activity_row(9, 7));

        let summary = dispatcher(outbox.clone(), true).drain_once().await.unwrap();
        assert_eq!(summary.dead, 1);
        assert_eq!(*outbox.dead.lock().unwrap(), vec![9]);
        assert!(outbox.retried.lock().unwrap().is_empty());
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_seconds(0), 30);
        assert_eq!(backoff_seconds(1), 60);
        assert_eq!(backoff_seconds(6), 1920);
        assert_eq!(backoff_seconds(20), 1920);
    }
}
