/**
 * Encryption of participant PII.
 *  - Process-wide key loading
 *  - Nonce-prefixed authenticated envelopes
 *  - Blind index for uniqueness checks
 */
pub mod crypto;
/**
 * The draw engine: the pure assignment generator
 *  and the scheduler that runs draws once a
 *  room's deadline has passed.
 */
pub mod draw;
/**
 * Notification messages and the transport
 *  interface the scheduler sends them through.
 */
pub mod notify;
pub mod room;
/**
 * Data access interface for rooms, plus an
 *  in-memory implementation.
 */
pub mod store;
/**
 * In-process fixtures for testing against the
 *  draw engine.
 */
pub mod testkit;
/**
 * Helper for reporting build version information.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{DecryptError, PiiKey};
    pub use crate::draw::{
        assign, AssignError, Assignment, DrawScheduler, Named, SchedulerConfig, SchedulerError,
        SchedulerHandle, TickReport,
    };
    pub use crate::notify::{Notification, Notifier};
    pub use crate::room::{Contact, DrawState, Participant, Room};
    pub use crate::store::{RoomStore, RoomStoreError};
    pub use crate::version::build_info;
}
