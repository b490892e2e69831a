//! Exactly-once ledger for side effects whose natural key is not the primary
//! key of the side effect itself.
//!
//! The insert is the compare-and-swap: a unique-constraint violation on the
//! ledger row is the authoritative "already claimed" signal. Pre-checking
//! with a query would be racy under concurrent callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;

/// Namespace for version-5 key derivation. Fixed so every instance derives
/// the same key for the same business string.
pub const IDEMPOTENCY_NAMESPACE: Uuid = Uuid::from_bytes([
    0x8e, 0x51, 0x2f, 0x0b, 0x4c, 0x1d, 0x5a, 0x9e, 0xb6, 0x3a, 0x77, 0x02, 0x41, 0x9c, 0xde,
    0x55,
]);

/// Derives a deterministic id from a stable business key such as
/// `"{correspondence_id}-{recipient}"`.
pub fn derive_idempotency_key(name: &str) -> Uuid {
    Uuid::new_v5(&IDEMPOTENCY_NAMESPACE, name.as_bytes())
}

/// The recipient action a claim guards, when the claim is action-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Fetched,
    Read,
    Confirmed,
    Archived,
    AttachmentDownloaded,
}

/// What kind of side effect the claim guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdempotencyType {
    NotificationOrder,
    DialogActivity,
}

/// One ledger row. Created once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdempotencyKey {
    pub id: Uuid,
    pub correspondence_id: Uuid,
    pub attachment_id: Option<Uuid>,
    pub action: Option<StatusAction>,
    pub idempotency_type: IdempotencyType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller owns the side effect and must perform it.
    Claimed,
    /// Another caller already did or is doing the work. Not an error.
    AlreadyClaimed,
}

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn try_claim(&self, key: &IdempotencyKey) -> Result<ClaimOutcome>;
}
