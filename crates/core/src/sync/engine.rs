//! Synchronization entry points.
//!
//! The engine owns the read-dedup-apply flow and the boundary logging. All
//! persistence goes through `CorrespondenceStore`; the engine itself holds no
//! state beyond its collaborators.

use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::events::ForwardingEvent;
use crate::sync::dedup::{dedup_delete_events, dedup_forwarding_events, dedup_status_events};
use crate::sync::store::{CorrespondenceStore, SyncBatch, SyncRequest};

pub struct SyncEngine {
    store: Arc<dyn CorrespondenceStore>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn CorrespondenceStore>) -> Self {
        Self { store }
    }

    /// Reconciles one inbound batch of status, delete and forwarding events
    /// into the correspondence timeline. Returns the correspondence id on
    /// success, including the no-op case where every event was a duplicate.
    pub async fn sync_correspondence_events(&self, request: SyncRequest) -> Result<Uuid> {
        let correspondence_id = request.correspondence_id;
        match self.sync_events_inner(request).await {
            Ok(id) => Ok(id),
            Err(err) => {
                log::error!(
                    "Failed to sync events for correspondence {}: {}",
                    correspondence_id,
                    err
                );
                Err(err)
            }
        }
    }

    async fn sync_events_inner(&self, request: SyncRequest) -> Result<Uuid> {
        let view = self.store.get_for_sync(request.correspondence_id).await?;
        if view.is_purged() {
            log::info!(
                "Correspondence {} is purged, rejecting sync attempt",
                view.id
            );
            return Err(Error::NotFound);
        }

        let status_events = dedup_status_events(view.id, &view.statuses, &request.status_events);
        let delete_events =
            dedup_delete_events(view.id, &view.delete_events, &request.delete_events);
        let forwarding_events = dedup_forwarding_events(
            view.id,
            &view.forwarding_events,
            &request.forwarding_events,
        );

        let batch = SyncBatch {
            status_events,
            delete_events,
        };
        if batch.is_empty() && forwarding_events.is_empty() {
            log::info!(
                "Sync batch for correspondence {} contained no new events",
                view.id
            );
            return Ok(view.id);
        }

        if !batch.is_empty() {
            self.store.apply_sync_batch(view.id, batch).await?;
        }
        if !forwarding_events.is_empty() {
            self.store
                .append_forwarding_events(view.id, forwarding_events)
                .await?;
        }

        log::info!("Synced events for correspondence {}", view.id);
        Ok(view.id)
    }

    /// Forwarding-only sync used by the dedicated forwarding handler.
    pub async fn sync_forwarding_events(
        &self,
        correspondence_id: Uuid,
        forwarding_events: Vec<ForwardingEvent>,
    ) -> Result<Uuid> {
        self.sync_correspondence_events(SyncRequest {
            correspondence_id,
            status_events: Vec::new(),
            delete_events: Vec::new(),
            forwarding_events,
        })
        .await
    }
}
