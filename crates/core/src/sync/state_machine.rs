//! Advance-only status state machine with lifecycle guards.

use crate::correspondence::{CorrespondenceStatus, SyncView};
use crate::errors::{Error, GuardViolation, Result};

/// Outcome of validating a status transition against a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The target status is genuinely new and may be appended.
    Advance,
    /// The target does not move the lifecycle forward. Appending it is
    /// skipped without error so replays stay idempotent.
    NoOp,
}

/// Validates a single status transition against the current timeline.
///
/// Guards reflect the recipient lifecycle: a correspondence cannot be read or
/// confirmed before it was fetched, and archiving requires confirmation when
/// the sender demands one. Purge is terminal, so any transition attempted
/// afterwards reports the correspondence as gone.
pub fn validate_transition(view: &SyncView, target: CorrespondenceStatus) -> Result<Transition> {
    let current = view
        .highest_status()
        .ok_or(Error::CouldNotRetrieveStatus)?
        .status;

    if view.is_purged() {
        return Err(Error::NotFound);
    }

    match target {
        CorrespondenceStatus::Read if !view.status_has_been(CorrespondenceStatus::Fetched) => {
            return Err(Error::Guard(GuardViolation::ReadBeforeFetched));
        }
        CorrespondenceStatus::Confirmed
            if !view.status_has_been(CorrespondenceStatus::Fetched) =>
        {
            return Err(Error::Guard(GuardViolation::ConfirmBeforeFetched));
        }
        CorrespondenceStatus::Archived
            if view.is_confirmation_needed
                && !view.status_has_been(CorrespondenceStatus::Confirmed) =>
        {
            return Err(Error::Guard(GuardViolation::ArchiveBeforeConfirmed));
        }
        _ => {}
    }

    if target <= current {
        log::debug!(
            "Status {} does not advance correspondence {} past {}, skipping append",
            target,
            view.id,
            current
        );
        return Ok(Transition::NoOp);
    }

    Ok(Transition::Advance)
}
