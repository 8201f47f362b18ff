use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use common::room::Room;

use super::{unique_violation, WriteError};
use crate::database::types::DUuid;
use crate::database::Database;

/// Input of the room-creation flow; credentials arrive already hashed
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub admin_password_hash: String,
    pub join_password_hash: String,
    pub deadline: OffsetDateTime,
}

/// A row of the `rooms` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomRecord {
    pub id: DUuid,
    pub name: String,
    pub admin_password_hash: String,
    pub join_password_hash: String,
    pub deadline: OffsetDateTime,
    pub draw_completed: bool,
    pub created_at: OffsetDateTime,
}

impl From<RoomRecord> for Room {
    fn from(record: RoomRecord) -> Self {
        Room {
            id: record.id.into(),
            name: record.name,
            admin_password_hash: record.admin_password_hash,
            join_password_hash: record.join_password_hash,
            deadline: record.deadline,
            draw_completed: record.draw_completed,
            created_at: record.created_at,
        }
    }
}

impl RoomRecord {
    /// Create a room; it starts undrawn
    pub async fn create(new: &NewRoom, db: &Database) -> Result<RoomRecord, WriteError> {
        let id = DUuid::new();
        let created_at = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, name, admin_password_hash, join_password_hash,
                deadline, draw_completed, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.admin_password_hash)
        .bind(&new.join_password_hash)
        .bind(new.deadline)
        .bind(created_at)
        .execute(&**db)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => WriteError::DuplicateRoomName,
            None => WriteError::Sqlx(e),
        })?;

        Self::get(*id, db)
            .await?
            .ok_or(WriteError::Sqlx(sqlx::Error::RowNotFound))
    }

    pub async fn get(id: Uuid, db: &Database) -> Result<Option<RoomRecord>, sqlx::Error> {
        let id = DUuid::from(id);
        sqlx::query_as::<_, RoomRecord>(
            r#"
            SELECT
                id, name, admin_password_hash, join_password_hash,
                deadline, draw_completed, created_at
            FROM rooms
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**db)
        .await
    }

    /// Every room, earliest deadline first
    pub async fn list(db: &Database) -> Result<Vec<RoomRecord>, sqlx::Error> {
        sqlx::query_as::<_, RoomRecord>(
            r#"
            SELECT
                id, name, admin_password_hash, join_password_hash,
                deadline, draw_completed, created_at
            FROM rooms
            ORDER BY deadline ASC, created_at ASC
            "#,
        )
        .fetch_all(&**db)
        .await
    }

    /// Set the draw flag if it is still clear
    ///
    /// Returns whether a row changed: `false` means the room is missing
    /// or was already drawn.
    pub async fn set_draw_completed(id: Uuid, db: &Database) -> Result<bool, sqlx::Error> {
        let id = DUuid::from(id);
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET draw_completed = 1
            WHERE id = ?1 AND draw_completed = 0
            "#,
        )
        .bind(id)
        .execute(&**db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
