//! Rooms and their participants as seen by the draw engine

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::draw::Named;

/// Where a room sits in its draw lifecycle at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawState {
    /// The deadline has not been reached yet
    Pending,
    /// The deadline has passed and no draw has completed
    Eligible,
    /// The draw completed; terminal
    Drawn,
}

/// A gift-exchange room
///
/// Created by the room-creation flow. The draw engine only reads it and,
/// once a draw succeeds, flips `draw_completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    pub admin_password_hash: String,
    pub join_password_hash: String,
    pub deadline: OffsetDateTime,
    pub draw_completed: bool,
    pub created_at: OffsetDateTime,
}

impl Room {
    pub fn draw_state(&self, now: OffsetDateTime) -> DrawState {
        if self.draw_completed {
            DrawState::Drawn
        } else if now >= self.deadline {
            DrawState::Eligible
        } else {
            DrawState::Pending
        }
    }

    pub fn is_eligible(&self, now: OffsetDateTime) -> bool {
        self.draw_state(now) == DrawState::Eligible
    }
}

/// A participant enrolled in a room, with their address still encrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    /// `PiiKey` envelope of the participant's email address
    pub email_ciphertext: Vec<u8>,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl Named for Participant {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A participant whose address has been decrypted for the current draw
///
/// Lives only in memory for the duration of one draw. The address is
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Contact {
    pub participant_id: Uuid,
    pub name: String,
    pub email: String,
}

impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("participant_id", &self.participant_id)
            .field("name", &self.name)
            .field("email", &"<redacted>")
            .finish()
    }
}

impl Named for Contact {
    fn name(&self) -> &str {
        &self.name
    }
}
