use std::fmt;

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use common::crypto::PiiKey;
use common::room::Participant;

use super::{foreign_key_violation, unique_violation, WriteError};
use crate::database::types::DUuid;
use crate::database::Database;

/// Input of the join flow
///
/// The address is plaintext here and only here; it is encrypted before
/// it reaches the database.
#[derive(Clone)]
pub struct NewParticipant {
    pub room_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewParticipant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewParticipant")
            .field("room_id", &self.room_id)
            .field("name", &self.name)
            .field("email", &"<redacted>")
            .finish()
    }
}

/// A row of the `participants` table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRecord {
    pub id: DUuid,
    pub room_id: DUuid,
    pub name: String,
    pub email_ciphertext: Vec<u8>,
    pub email_index: Vec<u8>,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl From<ParticipantRecord> for Participant {
    fn from(record: ParticipantRecord) -> Self {
        Participant {
            id: record.id.into(),
            room_id: record.room_id.into(),
            name: record.name,
            email_ciphertext: record.email_ciphertext,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

impl ParticipantRecord {
    /// Enroll a participant, encrypting their address under `key`
    ///
    /// Names and addresses are unique within a room; addresses are
    /// compared through their blind index, case-insensitively.
    pub async fn create(
        new: &NewParticipant,
        key: &PiiKey,
        db: &Database,
    ) -> Result<ParticipantRecord, WriteError> {
        let id = DUuid::new();
        let room_id = DUuid::from(new.room_id);
        let email_ciphertext = key.encrypt(new.email.trim().as_bytes())?;
        let email_index = key.blind_index(&new.email);
        let created_at = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            INSERT INTO participants (
                id, room_id, name, email_ciphertext, email_index,
                password_hash, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(id)
        .bind(room_id)
        .bind(&new.name)
        .bind(email_ciphertext)
        .bind(&email_index[..])
        .bind(&new.password_hash)
        .bind(created_at)
        .execute(&**db)
        .await
        .map_err(|e| {
            if let Some(message) = unique_violation(&e) {
                if message.contains("email_index") {
                    return WriteError::DuplicateEmail;
                }
                return WriteError::DuplicateParticipantName;
            }
            if foreign_key_violation(&e) {
                return WriteError::RoomNotFound(new.room_id);
            }
            WriteError::Sqlx(e)
        })?;

        Self::get(*id, db)
            .await?
            .ok_or(WriteError::Sqlx(sqlx::Error::RowNotFound))
    }

    pub async fn get(id: Uuid, db: &Database) -> Result<Option<ParticipantRecord>, sqlx::Error> {
        let id = DUuid::from(id);
        sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT
                id, room_id, name, email_ciphertext, email_index,
                password_hash, created_at
            FROM participants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**db)
        .await
    }

    /// Participants of a room in enrollment order
    pub async fn list_for_room(
        room_id: Uuid,
        db: &Database,
    ) -> Result<Vec<ParticipantRecord>, sqlx::Error> {
        let room_id = DUuid::from(room_id);
        sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT
                id, room_id, name, email_ciphertext, email_index,
                password_hash, created_at
            FROM participants
            WHERE room_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&**db)
        .await
    }
}
