mod participant;
mod room;

pub use participant::{NewParticipant, ParticipantRecord};
pub use room::{NewRoom, RoomRecord};

use uuid::Uuid;

use common::crypto::EncryptError;

/// Failures of the room and participant write helpers
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("a room with this name already exists")]
    DuplicateRoomName,
    #[error("this name is already taken in the room")]
    DuplicateParticipantName,
    #[error("this address is already enrolled in the room")]
    DuplicateEmail,
    #[error("room not found: {0}")]
    RoomNotFound(Uuid),
    #[error("failed to encrypt participant address: {0}")]
    Encrypt(#[from] EncryptError),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// The message of a unique constraint violation, if `err` is one
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Some(db_err.message()),
        _ => None,
    }
}

pub(crate) fn foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
