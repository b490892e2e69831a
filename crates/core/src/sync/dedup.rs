//! Duplicate filtering and chronological merge for synced events.
//!
//! The legacy source resends overlapping windows on retries and draws status
//! events from two data sources, so exactly-once application is derived from
//! content equality rather than from trusting provided ids. Timestamps are
//! compared at whole-second resolution to tolerate sub-second jitter between
//! the two sources.

use chrono::{DateTime, Timelike, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::correspondence::CorrespondenceStatus;
use crate::events::{DeleteEvent, DeleteEventType, ForwardingEvent, StatusEvent};

/// Statuses accepted from the legacy source during event sync. Everything
/// else is logged and dropped before dedup.
pub const SYNCABLE_STATUSES: [CorrespondenceStatus; 5] = [
    CorrespondenceStatus::Read,
    CorrespondenceStatus::Confirmed,
    CorrespondenceStatus::Archived,
    CorrespondenceStatus::PurgedByRecipient,
    CorrespondenceStatus::PurgedByAltinn,
];

/// Drops sub-second precision for duplicate comparison.
pub fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Whole-second equality used for all synced-event comparisons.
pub fn equals_to_second(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    truncate_to_second(a) == truncate_to_second(b)
}

fn status_dedup_key(event: &StatusEvent) -> (CorrespondenceStatus, DateTime<Utc>, Uuid) {
    (
        event.status,
        truncate_to_second(event.status_changed),
        event.party_uuid,
    )
}

/// Keeps only statuses valid for sync, then removes in-batch duplicates
/// (first occurrence wins) and events already present in the persisted
/// timeline.
pub fn dedup_status_events(
    correspondence_id: Uuid,
    existing: &[StatusEvent],
    incoming: &[StatusEvent],
) -> Vec<StatusEvent> {
    let mut seen: HashSet<(CorrespondenceStatus, DateTime<Utc>, Uuid)> =
        existing.iter().map(status_dedup_key).collect();

    let mut survivors = Vec::new();
    for event in incoming {
        if !SYNCABLE_STATUSES.contains(&event.status) {
            log::info!(
                "Status event for {} is not valid for sync and will be ignored. Status: {} - StatusChanged: {} - PartyUuid: {}",
                correspondence_id,
                event.status,
                event.status_changed,
                event.party_uuid
            );
            continue;
        }
        if seen.insert(status_dedup_key(event)) {
            survivors.push(event.clone());
        } else {
            log::info!(
                "Status event for {} is a duplicate of an existing event and will be skipped. Status: {} - StatusChanged: {} - PartyUuid: {}",
                correspondence_id,
                event.status,
                event.status_changed,
                event.party_uuid
            );
        }
    }
    survivors
}

/// Removes delete events whose type is already present, either persisted or
/// earlier in the batch. There is at most one live delete event per type.
pub fn dedup_delete_events(
    correspondence_id: Uuid,
    existing: &[DeleteEvent],
    incoming: &[DeleteEvent],
) -> Vec<DeleteEvent> {
    let mut seen: HashSet<DeleteEventType> =
        existing.iter().map(|event| event.event_type).collect();

    let mut survivors = Vec::new();
    for event in incoming {
        if seen.insert(event.event_type) {
            survivors.push(event.clone());
        } else {
            log::info!(
                "Delete event for {} is a duplicate of an existing event and will be skipped. EventType: {:?} - EventOccurred: {} - PartyUuid: {}",
                correspondence_id,
                event.event_type,
                event.event_occurred,
                event.party_uuid
            );
        }
    }
    survivors
}

type ForwardingKey = (
    DateTime<Utc>,
    Uuid,
    Option<Uuid>,
    Option<Uuid>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn forwarding_dedup_key(event: &ForwardingEvent) -> ForwardingKey {
    (
        truncate_to_second(event.forwarded_on),
        event.forwarded_by_party,
        event.forwarded_by_user,
        event.forwarded_to_user,
        event.forwarded_to_email.clone(),
        event.forwarding_text.clone(),
        event.mailbox_supplier.clone(),
    )
}

/// Composite-key duplicate filter for forwarding events. Two events are
/// duplicates only when every business field matches (forwarded-on compared
/// at whole-second resolution).
pub fn dedup_forwarding_events(
    correspondence_id: Uuid,
    existing: &[ForwardingEvent],
    incoming: &[ForwardingEvent],
) -> Vec<ForwardingEvent> {
    let mut seen: HashSet<ForwardingKey> = existing.iter().map(forwarding_dedup_key).collect();

    let mut survivors = Vec::new();
    for event in incoming {
        if seen.insert(forwarding_dedup_key(event)) {
            survivors.push(event.clone());
        } else {
            log::warn!(
                "Forwarding event already exists for correspondence {}. Skipping sync.",
                correspondence_id
            );
        }
    }
    survivors
}

/// One entry of the merged replay queue.
#[derive(Debug, Clone, PartialEq)]
pub enum MergedEvent {
    Status(StatusEvent),
    Delete(DeleteEvent),
}

impl MergedEvent {
    /// The event's own timestamp, which drives replay order.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MergedEvent::Status(event) => event.status_changed,
            MergedEvent::Delete(event) => event.event_occurred,
        }
    }
}

/// Concatenates surviving status and delete events into a single queue
/// ordered ascending by the event's own timestamp. The sort is stable, so
/// ties keep their relative input order (status events before delete events
/// at the same instant).
pub fn merge_chronological(
    status_events: Vec<StatusEvent>,
    delete_events: Vec<DeleteEvent>,
) -> Vec<MergedEvent> {
    let mut merged: Vec<MergedEvent> = status_events
        .into_iter()
        .map(MergedEvent::Status)
        .chain(delete_events.into_iter().map(MergedEvent::Delete))
        .collect();
    merged.sort_by_key(MergedEvent::occurred_at);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    fn status_event(status: CorrespondenceStatus, ts: DateTime<Utc>, party: Uuid) -> StatusEvent {
        StatusEvent {
            id: Uuid::new_v4(),
            correspondence_id: Uuid::new_v4(),
            status,
            status_text: status.to_string(),
            status_changed: ts,
            party_uuid: party,
            synced_from_legacy_at: None,
        }
    }

    fn delete_event(event_type: DeleteEventType, ts: DateTime<Utc>) -> DeleteEvent {
        DeleteEvent {
            id: Uuid::new_v4(),
            correspondence_id: Uuid::new_v4(),
            event_type,
            event_occurred: ts,
            party_uuid: Uuid::new_v4(),
            synced_from_legacy_at: None,
        }
    }

    fn forwarding_event(text: Option<&str>, ts: DateTime<Utc>, party: Uuid) -> ForwardingEvent {
        ForwardingEvent {
            id: Uuid::new_v4(),
            correspondence_id: Uuid::new_v4(),
            forwarded_on: ts,
            forwarded_by_party: party,
            forwarded_by_user: None,
            forwarded_to_user: None,
            forwarded_to_email: Some("recipient@example.com".to_string()),
            forwarding_text: text.map(str::to_string),
            mailbox_supplier: None,
            synced_from_legacy_at: None,
        }
    }

    #[test]
    fn status_duplicates_tolerate_subsecond_jitter() {
        let party = Uuid::new_v4();
        let persisted = status_event(CorrespondenceStatus::Read, at(8, 0, 0), party);
        let mut jittered = status_event(CorrespondenceStatus::Read, at(8, 0, 0), party);
        jittered.status_changed = at(8, 0, 0) + chrono::Duration::milliseconds(480);

        let survivors = dedup_status_events(Uuid::new_v4(), &[persisted], &[jittered]);
        assert!(survivors.is_empty());
    }

    #[test]
    fn status_in_batch_duplicates_keep_first_occurrence() {
        let party = Uuid::new_v4();
        let first = status_event(CorrespondenceStatus::Confirmed, at(9, 0, 0), party);
        let second = status_event(CorrespondenceStatus::Confirmed, at(9, 0, 0), party);

        let survivors = dedup_status_events(Uuid::new_v4(), &[], &[first.clone(), second]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, first.id);
    }

    #[test]
    fn status_differing_party_is_not_a_duplicate() {
        let persisted = status_event(CorrespondenceStatus::Read, at(8, 0, 0), Uuid::new_v4());
        let other = status_event(CorrespondenceStatus::Read, at(8, 0, 0), Uuid::new_v4());

        let survivors = dedup_status_events(Uuid::new_v4(), &[persisted], &[other]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn invalid_statuses_are_dropped_before_dedup() {
        let incoming = vec![
            status_event(CorrespondenceStatus::Initialized, at(8, 0, 0), Uuid::new_v4()),
            status_event(CorrespondenceStatus::Read, at(8, 0, 1), Uuid::new_v4()),
        ];
        let survivors = dedup_status_events(Uuid::new_v4(), &[], &incoming);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].status, CorrespondenceStatus::Read);
    }

    #[test]
    fn delete_events_deduped_by_type() {
        let persisted = delete_event(DeleteEventType::SoftDeletedByRecipient, at(8, 0, 0));
        let incoming = vec![
            delete_event(DeleteEventType::SoftDeletedByRecipient, at(10, 0, 0)),
            delete_event(DeleteEventType::RestoredByRecipient, at(11, 0, 0)),
        ];
        let survivors = dedup_delete_events(Uuid::new_v4(), &[persisted], &incoming);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].event_type, DeleteEventType::RestoredByRecipient);
    }

    #[test]
    fn forwarding_text_distinguishes_events() {
        let party = Uuid::new_v4();
        let persisted = forwarding_event(Some("see attached"), at(8, 0, 0), party);
        let mut same = forwarding_event(Some("see attached"), at(8, 0, 0), party);
        same.forwarded_to_email = persisted.forwarded_to_email.clone();
        let different_text = forwarding_event(Some("please handle"), at(8, 0, 0), party);

        let survivors =
            dedup_forwarding_events(Uuid::new_v4(), &[persisted], &[same, different_text]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(
            survivors[0].forwarding_text.as_deref(),
            Some("please handle")
        );
    }

    #[test]
    fn merge_orders_by_event_timestamp_regardless_of_submission_order() {
        let a = status_event(CorrespondenceStatus::Read, at(8, 0, 0), Uuid::new_v4());
        let b = status_event(CorrespondenceStatus::Confirmed, at(9, 0, 0), Uuid::new_v4());
        let c = status_event(CorrespondenceStatus::Archived, at(10, 0, 0), Uuid::new_v4());

        let merged = merge_chronological(vec![c.clone(), a.clone(), b.clone()], Vec::new());
        let order: Vec<DateTime<Utc>> = merged.iter().map(MergedEvent::occurred_at).collect();
        assert_eq!(order, vec![at(8, 0, 0), at(9, 0, 0), at(10, 0, 0)]);
    }

    #[test]
    fn merge_interleaves_delete_events_and_is_stable_on_ties() {
        let read = status_event(CorrespondenceStatus::Read, at(9, 0, 0), Uuid::new_v4());
        let delete = delete_event(DeleteEventType::HardDeletedByRecipient, at(9, 0, 0));

        let merged = merge_chronological(vec![read], vec![delete]);
        assert!(matches!(merged[0], MergedEvent::Status(_)));
        assert!(matches!(merged[1], MergedEvent::Delete(_)));
    }
}
