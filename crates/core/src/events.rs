//! Immutable event value types for the correspondence timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correspondence::CorrespondenceStatus;

/// One appended status change. Never mutated or reordered once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub id: Uuid,
    pub correspondence_id: Uuid,
    pub status: CorrespondenceStatus,
    pub status_text: String,
    pub status_changed: DateTime<Utc>,
    pub party_uuid: Uuid,
    /// Set only for events replayed from the legacy source system.
    pub synced_from_legacy_at: Option<DateTime<Utc>>,
}

/// Kind of deletion recorded by the legacy source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteEventType {
    HardDeletedByRecipient,
    HardDeletedByServiceOwner,
    SoftDeletedByRecipient,
    RestoredByRecipient,
}

impl DeleteEventType {
    /// Hard deletes translate into a terminal purge status during replay.
    pub fn is_hard_delete(self) -> bool {
        matches!(
            self,
            DeleteEventType::HardDeletedByRecipient | DeleteEventType::HardDeletedByServiceOwner
        )
    }
}

/// Deletion event. Modeled separately from status changes because deletion
/// also triggers attachment purge and must merge with status events by
/// timestamp before replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEvent {
    pub id: Uuid,
    pub correspondence_id: Uuid,
    pub event_type: DeleteEventType,
    pub event_occurred: DateTime<Utc>,
    pub party_uuid: Uuid,
    pub synced_from_legacy_at: Option<DateTime<Utc>>,
}

/// Records that the recipient forwarded the correspondence to another party.
///
/// The legacy source does not supply stable ids for these, so duplicate
/// detection uses the composite of all business fields instead of `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingEvent {
    pub id: Uuid,
    pub correspondence_id: Uuid,
    pub forwarded_on: DateTime<Utc>,
    pub forwarded_by_party: Uuid,
    pub forwarded_by_user: Option<Uuid>,
    pub forwarded_to_user: Option<Uuid>,
    pub forwarded_to_email: Option<String>,
    pub forwarding_text: Option<String>,
    pub mailbox_supplier: Option<String>,
    pub synced_from_legacy_at: Option<DateTime<Utc>>,
}

/// A notification order persisted for a correspondence recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: Uuid,
    pub correspondence_id: Uuid,
    pub recipient: String,
    pub notification_channel: String,
    pub created: DateTime<Utc>,
    pub notification_sent: Option<DateTime<Utc>>,
}
