use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::crypto::{PiiKey, KEY_SIZE};
use crate::room::{Participant, Room};
use crate::store::MemoryRoomStore;

/// A fixed key so failures are reproducible
pub fn test_key() -> PiiKey {
    PiiKey::from([42u8; KEY_SIZE])
}

/// The address fixtures give a participant called `name`
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

/// Builder for a room and its participants
#[derive(Debug, Clone)]
pub struct TestRoom {
    pub room: Room,
    pub participants: Vec<Participant>,
}

impl TestRoom {
    pub fn new(name: &str, deadline: OffsetDateTime) -> Self {
        let created_at = deadline - Duration::days(14);
        Self {
            room: Room {
                id: Uuid::new_v4(),
                name: name.to_string(),
                admin_password_hash: "admin-hash".to_string(),
                join_password_hash: "join-hash".to_string(),
                deadline,
                draw_completed: false,
                created_at,
            },
            participants: Vec::new(),
        }
    }

    /// A room whose deadline passed an hour ago
    pub fn past_deadline(name: &str) -> Self {
        Self::new(name, OffsetDateTime::now_utc() - Duration::hours(1))
    }

    /// A room whose deadline is a day away
    pub fn future_deadline(name: &str) -> Self {
        Self::new(name, OffsetDateTime::now_utc() + Duration::days(1))
    }

    pub fn drawn(mut self) -> Self {
        self.room.draw_completed = true;
        self
    }

    /// Enroll participants with addresses from [`email_for`], encrypted under `key`
    pub fn with_participants(mut self, key: &PiiKey, names: &[&str]) -> Self {
        for name in names {
            let ciphertext = key
                .encrypt(email_for(name).as_bytes())
                .expect("fixture encryption");
            self = self.with_raw_participant(name, ciphertext);
        }
        self
    }

    /// Enroll a participant with an arbitrary stored ciphertext
    pub fn with_raw_participant(mut self, name: &str, email_ciphertext: Vec<u8>) -> Self {
        let created_at = self.room.created_at + Duration::minutes(self.participants.len() as i64);
        self.participants.push(Participant {
            id: Uuid::new_v4(),
            room_id: self.room.id,
            name: name.to_string(),
            email_ciphertext,
            password_hash: "participant-hash".to_string(),
            created_at,
        });
        self
    }

    /// Load the room and its participants into `store`, returning the room id
    pub fn insert_into(self, store: &MemoryRoomStore) -> Uuid {
        let id = self.room.id;
        store.insert_room(self.room);
        for participant in self.participants {
            store.insert_participant(participant);
        }
        id
    }
}
