//! Error types shared across the engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle precondition that failed for an attempted status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardViolation {
    /// `Read` requires the correspondence to have been `Fetched` first.
    ReadBeforeFetched,
    /// `Confirmed` requires the correspondence to have been `Fetched` first.
    ConfirmBeforeFetched,
    /// `Archived` requires `Confirmed` when confirmation is needed.
    ArchiveBeforeConfirmed,
}

impl std::fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GuardViolation::ReadBeforeFetched => "correspondence has not been fetched, cannot mark as read",
            GuardViolation::ConfirmBeforeFetched => "correspondence has not been fetched, cannot confirm",
            GuardViolation::ArchiveBeforeConfirmed => {
                "correspondence requires confirmation before it can be archived"
            }
        };
        write!(f, "{}", text)
    }
}

/// Database-layer failures, classified for retry decisions.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Serialization conflict, deadlock or busy/locked database. Safe to retry.
    #[error("Transient database conflict: {0}")]
    Transient(String),

    /// A unique constraint rejected an insert.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Connection pool or connectivity failure.
    #[error("Database connection failure: {0}")]
    Connection(String),

    /// Anything else the storage layer could not classify.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors surfaced by the synchronization engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Correspondence (or other referenced entity) does not exist, or is in a
    /// terminal purged state and must be treated as gone.
    #[error("Correspondence not found")]
    NotFound,

    /// The correspondence carries no status events at all.
    #[error("Could not retrieve current status for correspondence")]
    CouldNotRetrieveStatus,

    /// A status transition violated a lifecycle guard.
    #[error("Status transition rejected: {0}")]
    Guard(GuardViolation),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock backend failure (not "lock unavailable", which is an outcome).
    #[error("Lock coordination error: {0}")]
    Lock(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the failure is worth retrying with the same inputs.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::Transient(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::Database(DatabaseError::Transient("database is locked".into())).is_transient());
        assert!(!Error::Database(DatabaseError::Internal("boom".into())).is_transient());
        assert!(!Error::NotFound.is_transient());
        assert!(!Error::Guard(GuardViolation::ReadBeforeFetched).is_transient());
    }
}
