//! Database models for the correspondence aggregate and its event tables.
//!
//! Timestamps are stored as RFC 3339 TEXT, enums as their serde string form.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use correspondence_core::correspondence::SyncView;
use correspondence_core::errors::{Error, Result};
use correspondence_core::events::{
    DeleteEvent, ForwardingEvent, NotificationEvent, StatusEvent,
};

pub(crate) fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

pub(crate) fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| Error::Unexpected(format!("Invalid timestamp '{}': {}", value, err)))
}

pub(crate) fn format_opt_ts(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(format_ts)
}

pub(crate) fn parse_opt_ts(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_ts).transpose()
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|err| Error::Unexpected(format!("Invalid uuid '{}': {}", value, err)))
}

pub(crate) fn parse_opt_uuid(value: Option<&str>) -> Result<Option<Uuid>> {
    value.map(parse_uuid).transpose()
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::correspondences)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CorrespondenceDB {
    pub id: String,
    pub resource_id: String,
    pub sender: String,
    pub recipient: String,
    pub created: String,
    pub requested_publish_time: Option<String>,
    pub due_date_time: Option<String>,
    pub allow_system_delete_after: Option<String>,
    pub is_confirmation_needed: bool,
    pub is_migrating: bool,
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(primary_key(seq))]
#[diesel(table_name = crate::schema::correspondence_statuses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatusEventDB {
    pub seq: i64,
    pub id: String,
    pub correspondence_id: String,
    pub status: String,
    pub status_text: String,
    pub status_changed: String,
    pub party_uuid: String,
    pub synced_from_legacy_at: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::correspondence_statuses)]
pub struct NewStatusEventDB {
    pub id: String,
    pub correspondence_id: String,
    pub status: String,
    pub status_text: String,
    pub status_changed: String,
    pub party_uuid: String,
    pub synced_from_legacy_at: Option<String>,
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::correspondence_delete_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeleteEventDB {
    pub id: String,
    pub correspondence_id: String,
    pub event_type: String,
    pub event_occurred: String,
    pub party_uuid: String,
    pub synced_from_legacy_at: Option<String>,
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::correspondence_forwarding_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ForwardingEventDB {
    pub id: String,
    pub correspondence_id: String,
    pub forwarded_on: String,
    pub forwarded_by_party: String,
    pub forwarded_by_user: Option<String>,
    pub forwarded_to_user: Option<String>,
    pub forwarded_to_email: Option<String>,
    pub forwarding_text: Option<String>,
    pub mailbox_supplier: Option<String>,
    pub synced_from_legacy_at: Option<String>,
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::correspondence_notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationEventDB {
    pub id: String,
    pub correspondence_id: String,
    pub recipient: String,
    pub notification_channel: String,
    pub created: String,
    pub notification_sent: Option<String>,
}

impl TryFrom<StatusEventDB> for StatusEvent {
    type Error = Error;

    fn try_from(row: StatusEventDB) -> Result<Self> {
        Ok(StatusEvent {
            id: parse_uuid(&row.id)?,
            correspondence_id: parse_uuid(&row.correspondence_id)?,
            status: enum_from_db(&row.status)?,
            status_text: row.status_text,
            status_changed: parse_ts(&row.status_changed)?,
            party_uuid: parse_uuid(&row.party_uuid)?,
            synced_from_legacy_at: parse_opt_ts(row.synced_from_legacy_at.as_deref())?,
        })
    }
}

impl TryFrom<&StatusEvent> for NewStatusEventDB {
    type Error = Error;

    fn try_from(event: &StatusEvent) -> Result<Self> {
        Ok(NewStatusEventDB {
            id: event.id.to_string(),
            correspondence_id: event.correspondence_id.to_string(),
            status: enum_to_db(&event.status)?,
            status_text: event.status_text.clone(),
            status_changed: format_ts(event.status_changed),
            party_uuid: event.party_uuid.to_string(),
            synced_from_legacy_at: format_opt_ts(event.synced_from_legacy_at),
        })
    }
}

impl TryFrom<DeleteEventDB> for DeleteEvent {
    type Error = Error;

    fn try_from(row: DeleteEventDB) -> Result<Self> {
        Ok(DeleteEvent {
            id: parse_uuid(&row.id)?,
            correspondence_id: parse_uuid(&row.correspondence_id)?,
            event_type: enum_from_db(&row.event_type)?,
            event_occurred: parse_ts(&row.event_occurred)?,
            party_uuid: parse_uuid(&row.party_uuid)?,
            synced_from_legacy_at: parse_opt_ts(row.synced_from_legacy_at.as_deref())?,
        })
    }
}

impl TryFrom<&DeleteEvent> for DeleteEventDB {
    type Error = Error;

    fn try_from(event: &DeleteEvent) -> Result<Self> {
        Ok(DeleteEventDB {
            id: event.id.to_string(),
            correspondence_id: event.correspondence_id.to_string(),
            event_type: enum_to_db(&event.event_type)?,
            event_occurred: format_ts(event.event_occurred),
            party_uuid: event.party_uuid.to_string(),
            synced_from_legacy_at: format_opt_ts(event.synced_from_legacy_at),
        })
    }
}

impl TryFrom<ForwardingEventDB> for ForwardingEvent {
    type Error = Error;

    fn try_from(row: ForwardingEventDB) -> Result<Self> {
        Ok(ForwardingEvent {
            id: parse_uuid(&row.id)?,
            correspondence_id: parse_uuid(&row.correspondence_id)?,
            forwarded_on: parse_ts(&row.forwarded_on)?,
            forwarded_by_party: parse_uuid(&row.forwarded_by_party)?,
            forwarded_by_user: parse_opt_uuid(row.forwarded_by_user.as_deref())?,
            forwarded_to_user: parse_opt_uuid(row.forwarded_to_user.as_deref())?,
            forwarded_to_email: row.forwarded_to_email,
            forwarding_text: row.forwarding_text,
            mailbox_supplier: row.mailbox_supplier,
            synced_from_legacy_at: parse_opt_ts(row.synced_from_legacy_at.as_deref())?,
        })
    }
}

impl From<&ForwardingEvent> for ForwardingEventDB {
    fn from(event: &ForwardingEvent) -> Self {
        ForwardingEventDB {
            id: event.id.to_string(),
            correspondence_id: event.correspondence_id.to_string(),
            forwarded_on: format_ts(event.forwarded_on),
            forwarded_by_party: event.forwarded_by_party.to_string(),
            forwarded_by_user: event.forwarded_by_user.map(|id| id.to_string()),
            forwarded_to_user: event.forwarded_to_user.map(|id| id.to_string()),
            forwarded_to_email: event.forwarded_to_email.clone(),
            forwarding_text: event.forwarding_text.clone(),
            mailbox_supplier: event.mailbox_supplier.clone(),
            synced_from_legacy_at: format_opt_ts(event.synced_from_legacy_at),
        }
    }
}

impl TryFrom<NotificationEventDB> for NotificationEvent {
    type Error = Error;

    fn try_from(row: NotificationEventDB) -> Result<Self> {
        Ok(NotificationEvent {
            id: parse_uuid(&row.id)?,
            correspondence_id: parse_uuid(&row.correspondence_id)?,
            recipient: row.recipient,
            notification_channel: row.notification_channel,
            created: parse_ts(&row.created)?,
            notification_sent: parse_opt_ts(row.notification_sent.as_deref())?,
        })
    }
}

impl From<&NotificationEvent> for NotificationEventDB {
    fn from(event: &NotificationEvent) -> Self {
        NotificationEventDB {
            id: event.id.to_string(),
            correspondence_id: event.correspondence_id.to_string(),
            recipient: event.recipient.clone(),
            notification_channel: event.notification_channel.clone(),
            created: format_ts(event.created),
            notification_sent: format_opt_ts(event.notification_sent),
        }
    }
}

/// Builds the row and event collections of a `SyncView`.
pub(crate) fn view_from_rows(
    row: CorrespondenceDB,
    statuses: Vec<StatusEventDB>,
    delete_events: Vec<DeleteEventDB>,
    forwarding_events: Vec<ForwardingEventDB>,
) -> Result<SyncView> {
    Ok(SyncView {
        id: parse_uuid(&row.id)?,
        resource_id: row.resource_id,
        sender: row.sender,
        recipient: row.recipient,
        created: parse_ts(&row.created)?,
        requested_publish_time: parse_opt_ts(row.requested_publish_time.as_deref())?,
        due_date_time: parse_opt_ts(row.due_date_time.as_deref())?,
        allow_system_delete_after: parse_opt_ts(row.allow_system_delete_after.as_deref())?,
        is_confirmation_needed: row.is_confirmation_needed,
        is_migrating: row.is_migrating,
        statuses: statuses
            .into_iter()
            .map(StatusEvent::try_from)
            .collect::<Result<Vec<_>>>()?,
        delete_events: delete_events
            .into_iter()
            .map(DeleteEvent::try_from)
            .collect::<Result<Vec<_>>>()?,
        forwarding_events: forwarding_events
            .into_iter()
            .map(ForwardingEvent::try_from)
            .collect::<Result<Vec<_>>>()?,
    })
}

impl From<&SyncView> for CorrespondenceDB {
    fn from(view: &SyncView) -> Self {
        CorrespondenceDB {
            id: view.id.to_string(),
            resource_id: view.resource_id.clone(),
            sender: view.sender.clone(),
            recipient: view.recipient.clone(),
            created: format_ts(view.created),
            requested_publish_time: format_opt_ts(view.requested_publish_time),
            due_date_time: format_opt_ts(view.due_date_time),
            allow_system_delete_after: format_opt_ts(view.allow_system_delete_after),
            is_confirmation_needed: view.is_confirmation_needed,
            is_migrating: view.is_migrating,
        }
    }
}
