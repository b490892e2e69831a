//! Database model for the idempotency ledger.

use chrono::Utc;
use diesel::prelude::*;

use correspondence_core::errors::Result;
use correspondence_core::idempotency::IdempotencyKey;

use crate::correspondence::model::{enum_to_db, format_ts};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::idempotency_keys)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdempotencyKeyDB {
    pub id: String,
    pub correspondence_id: String,
    pub attachment_id: Option<String>,
    pub action: Option<String>,
    pub idempotency_type: String,
    pub created_at: String,
}

impl TryFrom<&IdempotencyKey> for IdempotencyKeyDB {
    type Error = correspondence_core::Error;

    fn try_from(key: &IdempotencyKey) -> Result<Self> {
        Ok(IdempotencyKeyDB {
            id: key.id.to_string(),
            correspondence_id: key.correspondence_id.to_string(),
            attachment_id: key.attachment_id.map(|id| id.to_string()),
            action: key.action.as_ref().map(enum_to_db).transpose()?,
            idempotency_type: enum_to_db(&key.idempotency_type)?,
            created_at: format_ts(Utc::now()),
        })
    }
}
