use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::provider::{RoomStore, RoomStoreError};
use crate::room::{Participant, Room};

/// In-memory room store using HashMaps
///
/// Counts the calls made against it so callers can assert what a
/// draw pass touched.
#[derive(Debug, Clone)]
pub struct MemoryRoomStore {
    inner: Arc<RwLock<MemoryRoomStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryRoomStoreInner {
    /// Rooms in insertion order
    rooms: Vec<Room>,
    /// room_id -> participants in enrollment order
    participants: HashMap<Uuid, Vec<Participant>>,
    /// When set, every call fails with `Unavailable`
    unavailable: bool,
    /// Rooms whose participant listing fails
    failing_participants: HashSet<Uuid>,
    /// Rooms whose completion write fails
    failing_completions: HashSet<Uuid>,
    stats: StoreStats,
}

/// Calls observed by a [`MemoryRoomStore`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub room_listings: usize,
    pub participant_listings: usize,
    pub completion_writes: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryRoomStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
    #[error("memory store unavailable")]
    Unavailable,
}

fn lock_error<E: std::fmt::Display>(e: E) -> RoomStoreError<MemoryRoomStoreError> {
    RoomStoreError::Provider(MemoryRoomStoreError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryRoomStoreInner::default())),
        }
    }

    /// Insert or replace a room
    pub fn insert_room(&self, room: Room) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.rooms.retain(|r| r.id != room.id);
        inner.participants.entry(room.id).or_default();
        inner.rooms.push(room);
    }

    /// Append a participant to its room
    pub fn insert_participant(&self, participant: Participant) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner
            .participants
            .entry(participant.room_id)
            .or_default()
            .push(participant);
    }

    pub fn room(&self, id: Uuid) -> Option<Room> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.rooms.iter().find(|r| r.id == id).cloned()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.unavailable = unavailable;
    }

    /// Make participant listings for `room_id` fail (or succeed again)
    pub fn fail_participants(&self, room_id: Uuid, failing: bool) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if failing {
            inner.failing_participants.insert(room_id);
        } else {
            inner.failing_participants.remove(&room_id);
        }
    }

    /// Make completion writes for `room_id` fail (or succeed again)
    pub fn fail_completion(&self, room_id: Uuid, failing: bool) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if failing {
            inner.failing_completions.insert(room_id);
        } else {
            inner.failing_completions.remove(&room_id);
        }
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.stats.clone()
    }
}

impl Default for MemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    type Error = MemoryRoomStoreError;

    async fn list_rooms(&self) -> Result<Vec<Room>, RoomStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.stats.room_listings += 1;
        if inner.unavailable {
            return Err(MemoryRoomStoreError::Unavailable.into());
        }

        Ok(inner.rooms.clone())
    }

    async fn list_participants(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<Participant>, RoomStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.stats.participant_listings += 1;
        if inner.unavailable || inner.failing_participants.contains(&room_id) {
            return Err(MemoryRoomStoreError::Unavailable.into());
        }

        inner
            .participants
            .get(&room_id)
            .cloned()
            .ok_or(RoomStoreError::RoomNotFound(room_id))
    }

    async fn mark_draw_completed(&self, room_id: Uuid) -> Result<(), RoomStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.stats.completion_writes += 1;
        if inner.unavailable || inner.failing_completions.contains(&room_id) {
            return Err(MemoryRoomStoreError::Unavailable.into());
        }

        let room = inner
            .rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(RoomStoreError::RoomNotFound(room_id))?;
        if room.draw_completed {
            return Err(RoomStoreError::AlreadyDrawn(room_id));
        }
        room.draw_completed = true;
        Ok(())
    }
}
