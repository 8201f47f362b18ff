pub mod memory;
mod provider;

pub use memory::{MemoryRoomStore, MemoryRoomStoreError, StoreStats};
pub use provider::{RoomStore, RoomStoreError};
