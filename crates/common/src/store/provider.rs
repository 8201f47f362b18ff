use std::fmt::{Debug, Display};

use async_trait::async_trait;
use uuid::Uuid;

use crate::room::{Participant, Room};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomStoreError<T> {
    /// The backing store failed
    #[error("unhandled room store provider error: {0}")]
    Provider(#[from] T),
    #[error("room not found: {0}")]
    RoomNotFound(Uuid),
    /// A completion write found the room already drawn --
    ///  someone else ran a draw for it first
    #[error("room already drawn: {0}")]
    AlreadyDrawn(Uuid),
}

/// Data access the draw engine needs from room storage
///
/// Storage itself (schema, connections, room and participant creation)
/// belongs to the implementation.
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug + 'static {
    type Error: Display + Debug + Send;

    /// List every room, drawn or not
    async fn list_rooms(&self) -> Result<Vec<Room>, RoomStoreError<Self::Error>>;

    /// List the participants of a room in enrollment order
    ///
    /// # Arguments
    /// * `room_id` - The room to list
    ///
    /// # Returns
    /// * `Ok(Vec<Participant>)` - Possibly empty
    /// * `Err(RoomStoreError::RoomNotFound)` - No such room
    async fn list_participants(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<Participant>, RoomStoreError<Self::Error>>;

    /// Flip the room's draw flag from false to true
    ///
    /// Should fail with the following errors to be considered
    ///  correct:
    /// * `Err(RoomStoreError::RoomNotFound)` - No such room
    /// * `Err(RoomStoreError::AlreadyDrawn)` - The flag was already set;
    ///   it must never be written twice
    async fn mark_draw_completed(&self, room_id: Uuid) -> Result<(), RoomStoreError<Self::Error>>;
}
