use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use uuid::Uuid;

/// A single "you are gifting X" message
///
/// Built by the scheduler from a decrypted contact; the address is
/// redacted from `Debug` output so notifications can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct Notification {
    pub room_id: Uuid,
    pub room_name: String,
    pub giver_name: String,
    pub giver_email: String,
    pub giftee_name: String,
}

impl Notification {
    pub fn subject(&self) -> String {
        format!("Your Secret Santa draw for {}", self.room_name)
    }

    pub fn body(&self) -> String {
        format!(
            "Hi {},\n\nThe draw for \"{}\" has happened. You are gifting {}.\n\nKeep it secret!\n",
            self.giver_name, self.room_name, self.giftee_name
        )
    }
}

impl Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("room_id", &self.room_id)
            .field("room_name", &self.room_name)
            .field("giver_name", &self.giver_name)
            .field("giver_email", &"<redacted>")
            .field("giftee_name", &"<redacted>")
            .finish()
    }
}

/// Delivers notifications to participants
///
/// Implementations send exactly one message per call and never retry;
/// the scheduler decides what a failure means.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    type Error: Display + Debug + Send;

    async fn notify(&self, notification: &Notification) -> Result<(), Self::Error>;
}
