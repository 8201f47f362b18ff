//! The deadline-triggered draw engine
//!
//! - [`assign`] turns a participant list into one gift-giving cycle
//! - [`DrawScheduler`] wakes on an interval, finds eligible rooms and runs
//!   decrypt -> assign -> notify -> mark-complete for each of them

mod assignment;
mod scheduler;

pub use assignment::{assign, AssignError, Assignment, Named, MIN_PARTICIPANTS};
pub use scheduler::{
    DeferReason, DrawScheduler, DrawSummary, RoomOutcome, SchedulerConfig, SchedulerError,
    SchedulerHandle, TickReport,
};
