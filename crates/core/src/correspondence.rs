//! Correspondence lifecycle statuses and the view the sync engine works on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{DeleteEvent, ForwardingEvent, StatusEvent};

/// Lifecycle status of a correspondence.
///
/// The declaration order doubles as the progression rank: a transition whose
/// target is not greater than the current highest status is an idempotent
/// no-op rather than an error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CorrespondenceStatus {
    /// Correspondence has been initialized.
    Initialized,
    /// Ready for publish, not yet available for the recipient.
    ReadyForPublish,
    /// Published and available for the recipient.
    Published,
    /// Fetched by the recipient.
    Fetched,
    /// Read by the recipient.
    Read,
    /// Recipient has replied.
    Replied,
    /// Confirmed by the recipient.
    Confirmed,
    /// Purged by the recipient. Terminal.
    PurgedByRecipient,
    /// Purged by the platform. Terminal.
    PurgedByAltinn,
    /// Archived by the recipient.
    Archived,
    /// Recipient has opted out of digital communication.
    Reserved,
    /// Failed during initialization or processing.
    Failed,
}

impl CorrespondenceStatus {
    /// Terminal purge states. Once reached, the correspondence is treated as
    /// gone for every subsequent operation.
    pub fn is_purged(self) -> bool {
        matches!(
            self,
            CorrespondenceStatus::PurgedByRecipient | CorrespondenceStatus::PurgedByAltinn
        )
    }

    /// Statuses in which the correspondence is visible to the recipient.
    pub fn is_available_for_recipient(self) -> bool {
        matches!(
            self,
            CorrespondenceStatus::Published
                | CorrespondenceStatus::Fetched
                | CorrespondenceStatus::Read
                | CorrespondenceStatus::Replied
                | CorrespondenceStatus::Confirmed
                | CorrespondenceStatus::Archived
        )
    }
}

impl std::fmt::Display for CorrespondenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CorrespondenceStatus::Initialized => "Initialized",
            CorrespondenceStatus::ReadyForPublish => "ReadyForPublish",
            CorrespondenceStatus::Published => "Published",
            CorrespondenceStatus::Fetched => "Fetched",
            CorrespondenceStatus::Read => "Read",
            CorrespondenceStatus::Replied => "Replied",
            CorrespondenceStatus::Confirmed => "Confirmed",
            CorrespondenceStatus::PurgedByRecipient => "PurgedByRecipient",
            CorrespondenceStatus::PurgedByAltinn => "PurgedByAltinn",
            CorrespondenceStatus::Archived => "Archived",
            CorrespondenceStatus::Reserved => "Reserved",
            CorrespondenceStatus::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Snapshot of one correspondence as the sync engine sees it.
///
/// Entities reference each other by id only; the event collections are plain
/// values resolved through the repository, never live back-references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncView {
    pub id: Uuid,
    pub resource_id: String,
    pub sender: String,
    pub recipient: String,
    pub created: DateTime<Utc>,
    pub requested_publish_time: Option<DateTime<Utc>>,
    pub due_date_time: Option<DateTime<Utc>>,
    pub allow_system_delete_after: Option<DateTime<Utc>>,
    pub is_confirmation_needed: bool,
    pub is_migrating: bool,
    /// Append-only, ordered by (status_changed, insertion order).
    pub statuses: Vec<StatusEvent>,
    pub delete_events: Vec<DeleteEvent>,
    pub forwarding_events: Vec<ForwardingEvent>,
}

impl SyncView {
    /// The status event with the greatest `status_changed`, ties broken by
    /// insertion order (later insert wins).
    pub fn highest_status(&self) -> Option<&StatusEvent> {
        let mut highest: Option<&StatusEvent> = None;
        for event in &self.statuses {
            match highest {
                Some(current) if event.status_changed < current.status_changed => {}
                _ => highest = Some(event),
            }
        }
        highest
    }

    /// Whether the timeline has ever contained the given status.
    pub fn status_has_been(&self, status: CorrespondenceStatus) -> bool {
        self.statuses.iter().any(|event| event.status == status)
    }

    pub fn is_purged(&self) -> bool {
        self.statuses.iter().any(|event| event.status.is_purged())
    }
}
