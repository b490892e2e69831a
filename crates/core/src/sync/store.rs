//! Persistence and collaborator seams used by the sync engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correspondence::SyncView;
use crate::errors::Result;
use crate::events::{DeleteEvent, ForwardingEvent, StatusEvent};

/// One inbound batch from the legacy source system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub correspondence_id: Uuid,
    #[serde(default)]
    pub status_events: Vec<StatusEvent>,
    #[serde(default)]
    pub delete_events: Vec<DeleteEvent>,
    #[serde(default)]
    pub forwarding_events: Vec<ForwardingEvent>,
}

/// Status and delete events that survived the engine's first dedup pass.
/// The executor re-runs dedup against fresh state inside its transaction, so
/// this is an optimization input, not a trusted one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncBatch {
    pub status_events: Vec<StatusEvent>,
    pub delete_events: Vec<DeleteEvent>,
}

impl SyncBatch {
    pub fn is_empty(&self) -> bool {
        self.status_events.is_empty() && self.delete_events.is_empty()
    }
}

/// Correspondence persistence as the engine sees it.
#[async_trait]
pub trait CorrespondenceStore: Send + Sync {
    /// Loads the correspondence with its full event collections, or
    /// `Error::NotFound`.
    async fn get_for_sync(&self, id: Uuid) -> Result<SyncView>;

    /// Applies the batch as one atomic unit: re-fetch inside the
    /// transaction, re-dedup, plan the replay, append all planned rows, run
    /// attachment purges and enqueue side-effect jobs. Transient conflicts
    /// are retried internally; partial application never commits.
    async fn apply_sync_batch(&self, correspondence_id: Uuid, batch: SyncBatch) -> Result<()>;

    /// Appends forwarding events atomically, re-checking the composite
    /// duplicate key inside the transaction, and enqueues one
    /// activity-report job per appended event.
    async fn append_forwarding_events(
        &self,
        correspondence_id: Uuid,
        events: Vec<ForwardingEvent>,
    ) -> Result<()>;
}

/// Attachment purge collaborator. Called synchronously inside the replay
/// transaction; its failure must roll the transaction back, which is why the
/// seam is not async.
pub trait AttachmentPurger: Send + Sync {
    fn check_and_purge_attachments(&self, correspondence_id: Uuid, acting_party: Uuid)
        -> Result<()>;
}

/// No-op purger for correspondences without attachments and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAttachmentPurger;

impl AttachmentPurger for NoopAttachmentPurger {
    fn check_and_purge_attachments(
        &self,
        _correspondence_id: Uuid,
        _acting_party: Uuid,
    ) -> Result<()> {
        Ok(())
    }
}
