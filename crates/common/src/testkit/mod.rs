//! Lightweight fixtures for exercising the draw engine in-process
//!
//! Builds rooms and participants with properly encrypted addresses and
//! provides a [`RecordingNotifier`] that captures (or fails) sends instead
//! of delivering them.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::{RecordingNotifier, TestRoom};
//!
//! #[tokio::test]
//! async fn test_draw() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = common::testkit::test_key();
//!     let store = MemoryRoomStore::new();
//!     let room = TestRoom::past_deadline("office")
//!         .with_participants(&key, &["Alice", "Bob", "Carol"])
//!         .insert_into(&store);
//!
//!     let notifier = RecordingNotifier::new();
//!     let scheduler = DrawScheduler::new(store, notifier.clone(), key, Default::default());
//!     scheduler.tick().await?;
//!
//!     assert_eq!(notifier.sent().len(), 3);
//!     Ok(())
//! }
//! ```

mod fixtures;
mod notifier;

pub use fixtures::{email_for, test_key, TestRoom};
pub use notifier::{RecordingNotifier, RecordingNotifierError};
