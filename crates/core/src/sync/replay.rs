//! Pure replay planning over a merged event queue.
//!
//! The planner walks the deduplicated queue strictly in chronological order
//! against an evolving copy of the timeline and produces a `ReplayPlan`: the
//! rows to append, the attachment purges to run and the side-effect jobs to
//! enqueue. The storage layer executes the plan inside one transaction, so a
//! planning error rolls the whole attempt back.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::correspondence::{CorrespondenceStatus, SyncView};
use crate::errors::Result;
use crate::events::{DeleteEvent, DeleteEventType, StatusEvent};
use crate::sync::dedup::MergedEvent;
use crate::sync::dispatch::{DomainEvent, LabelAction, SideEffectJob};
use crate::sync::state_machine::{validate_transition, Transition};

/// Attachment purge to run synchronously inside the replay transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPurge {
    pub party_uuid: Uuid,
}

/// Everything one replay attempt wants to persist and schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayPlan {
    pub status_rows: Vec<StatusEvent>,
    pub delete_rows: Vec<DeleteEvent>,
    pub purges: Vec<PlannedPurge>,
    pub jobs: Vec<SideEffectJob>,
}

impl ReplayPlan {
    pub fn is_empty(&self) -> bool {
        self.status_rows.is_empty() && self.delete_rows.is_empty()
    }
}

/// Plans the application of a merged event queue against a fresh timeline
/// snapshot. `synced_at` stamps every appended row as legacy-synced.
pub fn plan_replay(
    view: &SyncView,
    merged: Vec<MergedEvent>,
    synced_at: DateTime<Utc>,
) -> Result<ReplayPlan> {
    let mut evolving = view.clone();
    let mut plan = ReplayPlan::default();

    for event in merged {
        match event {
            MergedEvent::Status(status_event) => {
                plan_status_event(&mut evolving, &mut plan, status_event, synced_at)?;
            }
            MergedEvent::Delete(delete_event) => {
                plan_delete_event(&mut evolving, &mut plan, delete_event, synced_at);
            }
        }
    }

    Ok(plan)
}

fn plan_status_event(
    evolving: &mut SyncView,
    plan: &mut ReplayPlan,
    event: StatusEvent,
    synced_at: DateTime<Utc>,
) -> Result<()> {
    // Purge is terminal and independent of how far the lifecycle has advanced:
    // an archived correspondence can still be purged. It takes the same path
    // as a hard delete, and is skipped when the timeline is already purged.
    if event.status.is_purged() {
        if !evolving.is_purged() {
            let mut row = event;
            row.synced_from_legacy_at = Some(synced_at);
            plan_purge(evolving, plan, row);
        }
        return Ok(());
    }

    match validate_transition(evolving, event.status)? {
        Transition::NoOp => Ok(()),
        Transition::Advance => {
            let mut row = event;
            row.synced_from_legacy_at = Some(synced_at);

            plan.jobs
                .extend(status_jobs(evolving, row.status, row.party_uuid, row.status_changed));

            evolving.statuses.push(row.clone());
            plan.status_rows.push(row);
            Ok(())
        }
    }
}

/// Appends the terminal purge status row, the synchronous attachment purge
/// and the purged domain event. Dialogporten activity stays suppressed while
/// the correspondence is migrating.
fn plan_purge(evolving: &mut SyncView, plan: &mut ReplayPlan, row: StatusEvent) {
    plan.jobs.push(SideEffectJob::PublishDomainEvent {
        correspondence_id: row.correspondence_id,
        event: DomainEvent::Purged,
    });
    if !evolving.is_migrating {
        plan.jobs.push(SideEffectJob::ReportActivity {
            correspondence_id: row.correspondence_id,
            status: row.status,
            party_uuid: row.party_uuid,
            occurred: row.status_changed,
        });
    }
    plan.purges.push(PlannedPurge {
        party_uuid: row.party_uuid,
    });
    evolving.statuses.push(row.clone());
    plan.status_rows.push(row);
}

fn plan_delete_event(
    evolving: &mut SyncView,
    plan: &mut ReplayPlan,
    event: DeleteEvent,
    synced_at: DateTime<Utc>,
) {
    let mut row = event;
    row.synced_from_legacy_at = Some(synced_at);

    if row.event_type.is_hard_delete() {
        // A hard delete is a purge. The purge status row, the attachment
        // purge and the purged domain event are skipped when the timeline is
        // already purged; the delete row itself survived dedup and is kept.
        if !evolving.is_purged() {
            let purge_status = match row.event_type {
                DeleteEventType::HardDeletedByServiceOwner => CorrespondenceStatus::PurgedByAltinn,
                _ => CorrespondenceStatus::PurgedByRecipient,
            };
            let status_row = StatusEvent {
                id: Uuid::new_v4(),
                correspondence_id: row.correspondence_id,
                status: purge_status,
                status_text: purge_status.to_string(),
                status_changed: row.event_occurred,
                party_uuid: row.party_uuid,
                synced_from_legacy_at: Some(synced_at),
            };
            plan_purge(evolving, plan, status_row);
        }
    } else if !evolving.is_migrating {
        let action = match row.event_type {
            DeleteEventType::RestoredByRecipient => LabelAction::ClearSoftDeleted,
            _ => LabelAction::SetSoftDeleted,
        };
        plan.jobs.push(SideEffectJob::DialogLabel {
            correspondence_id: row.correspondence_id,
            action,
        });
    }

    evolving.delete_events.push(row.clone());
    plan.delete_rows.push(row);
}

fn status_jobs(
    view: &SyncView,
    status: CorrespondenceStatus,
    party_uuid: Uuid,
    occurred: DateTime<Utc>,
) -> Vec<SideEffectJob> {
    let mut jobs = Vec::new();

    match status {
        CorrespondenceStatus::Read => jobs.push(SideEffectJob::PublishDomainEvent {
            correspondence_id: view.id,
            event: DomainEvent::ReceiverRead,
        }),
        CorrespondenceStatus::Confirmed => jobs.push(SideEffectJob::PublishDomainEvent {
            correspondence_id: view.id,
            event: DomainEvent::ReceiverConfirmed,
        }),
        _ => {}
    }

    // Dialogporten traffic is suppressed while the correspondence is still
    // being migrated; the migration job patches the dialog wholesale at the
    // end instead. Activity entries exist only for the recipient actions
    // `Read` and `Confirmed`; archiving just patches the dialog.
    if !view.is_migrating {
        if matches!(
            status,
            CorrespondenceStatus::Read | CorrespondenceStatus::Confirmed
        ) {
            jobs.push(SideEffectJob::ReportActivity {
                correspondence_id: view.id,
                status,
                party_uuid,
                occurred,
            });
        }
        if matches!(
            status,
            CorrespondenceStatus::Confirmed | CorrespondenceStatus::Archived
        ) {
            jobs.push(SideEffectJob::PatchDialog {
                correspondence_id: view.id,
                status,
            });
        }
    }

    jobs
}
