//! Storage-side error type and its mapping onto the engine's taxonomy.

use correspondence_core::errors::{DatabaseError, Error};
use diesel::result::DatabaseErrorKind;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Connection failure: {0}")]
    Connection(String),

    #[error("Migration failure: {0}")]
    Migration(String),
}

fn is_transient_sqlite_message(message: &str) -> bool {
    message.contains("database is locked") || message.contains("database table is locked")
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Diesel(diesel::result::Error::NotFound) => Error::NotFound,
            StorageError::Diesel(diesel::result::Error::DatabaseError(kind, info)) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => {
                        Error::Database(DatabaseError::UniqueViolation(message))
                    }
                    DatabaseErrorKind::SerializationFailure => {
                        Error::Database(DatabaseError::Transient(message))
                    }
                    _ if is_transient_sqlite_message(&message) => {
                        Error::Database(DatabaseError::Transient(message))
                    }
                    _ => Error::Database(DatabaseError::Internal(message)),
                }
            }
            StorageError::Diesel(other) => {
                Error::Database(DatabaseError::Internal(other.to_string()))
            }
            StorageError::Pool(err) => Error::Database(DatabaseError::Connection(err.to_string())),
            StorageError::Connection(message) => {
                Error::Database(DatabaseError::Connection(message))
            }
            StorageError::Migration(message) => Error::Database(DatabaseError::Internal(message)),
        }
    }
}
