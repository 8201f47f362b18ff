use async_trait::async_trait;
use uuid::Uuid;

use common::room::{Participant, Room};
use common::store::{RoomStore, RoomStoreError};

use super::models::{ParticipantRecord, RoomRecord};
use super::Database;

#[async_trait]
impl RoomStore for Database {
    type Error = sqlx::Error;

    async fn list_rooms(&self) -> Result<Vec<Room>, RoomStoreError<Self::Error>> {
        let rooms = RoomRecord::list(self).await?;
        Ok(rooms.into_iter().map(Room::from).collect())
    }

    async fn list_participants(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<Participant>, RoomStoreError<Self::Error>> {
        let participants = ParticipantRecord::list_for_room(room_id, self).await?;
        if participants.is_empty() && RoomRecord::get(room_id, self).await?.is_none() {
            return Err(RoomStoreError::RoomNotFound(room_id));
        }

        Ok(participants.into_iter().map(Participant::from).collect())
    }

    async fn mark_draw_completed(&self, room_id: Uuid) -> Result<(), RoomStoreError<Self::Error>> {
        if RoomRecord::set_draw_completed(room_id, self).await? {
            return Ok(());
        }

        // nothing changed: tell a missing room from a second write
        match RoomRecord::get(room_id, self).await? {
            Some(_) => Err(RoomStoreError::AlreadyDrawn(room_id)),
            None => Err(RoomStoreError::RoomNotFound(room_id)),
        }
    }
}
