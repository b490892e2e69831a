//! Notification-order creation guarded by the idempotency ledger.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::Result;
use crate::events::NotificationEvent;
use crate::idempotency::{
    derive_idempotency_key, ClaimOutcome, IdempotencyKey, IdempotencyStore, IdempotencyType,
};

/// Persistence for notification orders.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, event: NotificationEvent) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

/// Creates at most one notification order per correspondence and recipient,
/// no matter how many times the creating handler runs.
pub struct NotificationOrderService {
    ledger: Arc<dyn IdempotencyStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationOrderService {
    pub fn new(ledger: Arc<dyn IdempotencyStore>, notifications: Arc<dyn NotificationStore>) -> Self {
        Self {
            ledger,
            notifications,
        }
    }

    /// Claims the derived key, then persists the order only on a successful
    /// claim. A duplicate claim logs and returns without side effect.
    pub async fn ensure_order(
        &self,
        correspondence_id: Uuid,
        recipient: &str,
        notification_channel: &str,
    ) -> Result<EnsureOutcome> {
        let key = IdempotencyKey {
            id: derive_idempotency_key(&format!("{}-{}", correspondence_id, recipient)),
            correspondence_id,
            attachment_id: None,
            action: None,
            idempotency_type: IdempotencyType::NotificationOrder,
        };

        match self.ledger.try_claim(&key).await? {
            ClaimOutcome::AlreadyClaimed => {
                log::info!(
                    "Notification order for correspondence {} and recipient already exists, skipping",
                    correspondence_id
                );
                Ok(EnsureOutcome::AlreadyExists)
            }
            ClaimOutcome::Claimed => {
                self.notifications
                    .insert_notification(NotificationEvent {
                        id: Uuid::new_v4(),
                        correspondence_id,
                        recipient: recipient.to_string(),
                        notification_channel: notification_channel.to_string(),
                        created: Utc::now(),
                        notification_sent: None,
                    })
                    .await?;
                Ok(EnsureOutcome::Created)
            }
        }
    }
}
