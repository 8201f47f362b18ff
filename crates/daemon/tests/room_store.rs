//! Integration tests for the SQLite room store

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use common::store::{RoomStore, RoomStoreError};
use common::testkit::test_key;
use santa_daemon::database::{NewParticipant, NewRoom, ParticipantRecord, RoomRecord, WriteError};
use santa_daemon::Database;

/// Create an in-memory test database
async fn setup_test_db() -> Database {
    let db_url = url::Url::parse("sqlite::memory:").unwrap();
    Database::connect(&db_url).await.unwrap()
}

fn new_room(name: &str, deadline: OffsetDateTime) -> NewRoom {
    NewRoom {
        name: name.to_string(),
        admin_password_hash: "$argon2id$admin".to_string(),
        join_password_hash: "$argon2id$join".to_string(),
        deadline,
    }
}

fn new_participant(room_id: Uuid, name: &str, email: &str) -> NewParticipant {
    NewParticipant {
        room_id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$participant".to_string(),
    }
}

#[tokio::test]
async fn test_create_and_get_room() {
    let db = setup_test_db().await;
    let deadline = OffsetDateTime::now_utc() + Duration::days(3);

    let room = RoomRecord::create(&new_room("office", deadline), &db)
        .await
        .unwrap();

    assert_eq!(room.name, "office");
    assert!(!room.draw_completed);
    assert_eq!(room.deadline.unix_timestamp(), deadline.unix_timestamp());

    let fetched = RoomRecord::get(*room.id, &db).await.unwrap().unwrap();
    assert_eq!(fetched.id, room.id);
    assert_eq!(fetched.admin_password_hash, "$argon2id$admin");

    assert!(RoomRecord::get(Uuid::new_v4(), &db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_room_names_are_unique() {
    let db = setup_test_db().await;
    let deadline = OffsetDateTime::now_utc();

    RoomRecord::create(&new_room("office", deadline), &db)
        .await
        .unwrap();
    let result = RoomRecord::create(&new_room("office", deadline), &db).await;

    assert!(matches!(result, Err(WriteError::DuplicateRoomName)));
}

#[tokio::test]
async fn test_list_rooms_through_store() {
    let db = setup_test_db().await;
    let now = OffsetDateTime::now_utc();

    let later = RoomRecord::create(&new_room("later", now + Duration::days(2)), &db)
        .await
        .unwrap();
    let sooner = RoomRecord::create(&new_room("sooner", now - Duration::days(1)), &db)
        .await
        .unwrap();

    let rooms = db.list_rooms().await.unwrap();
    let ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![*sooner.id, *later.id]);
    assert!(rooms[0].is_eligible(now));
    assert!(!rooms[1].is_eligible(now));
}

#[tokio::test]
async fn test_participants_are_encrypted_at_rest() {
    let db = setup_test_db().await;
    let key = test_key();
    let room = RoomRecord::create(&new_room("office", OffsetDateTime::now_utc()), &db)
        .await
        .unwrap();

    let record = ParticipantRecord::create(
        &new_participant(*room.id, "Alice", "Alice@Example.com "),
        &key,
        &db,
    )
    .await
    .unwrap();

    let raw = String::from_utf8_lossy(&record.email_ciphertext);
    assert!(!raw.to_lowercase().contains("alice@example.com"));
    assert_eq!(
        key.decrypt_string(&record.email_ciphertext).unwrap(),
        "Alice@Example.com"
    );
    assert_eq!(record.email_index, key.blind_index("alice@example.com").to_vec());

    let participants = db.list_participants(*room.id).await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].name, "Alice");
    assert_eq!(participants[0].room_id, *room.id);
    assert_eq!(participants[0].email_ciphertext, record.email_ciphertext);
}

#[tokio::test]
async fn test_participant_uniqueness_within_room() {
    let db = setup_test_db().await;
    let key = test_key();
    let now = OffsetDateTime::now_utc();
    let room = RoomRecord::create(&new_room("office", now), &db).await.unwrap();
    let other = RoomRecord::create(&new_room("family", now), &db).await.unwrap();

    ParticipantRecord::create(&new_participant(*room.id, "Alice", "alice@example.com"), &key, &db)
        .await
        .unwrap();

    let same_name = ParticipantRecord::create(
        &new_participant(*room.id, "Alice", "another@example.com"),
        &key,
        &db,
    )
    .await;
    assert!(matches!(same_name, Err(WriteError::DuplicateParticipantName)));

    // addresses compare case-insensitively through the blind index
    let same_email = ParticipantRecord::create(
        &new_participant(*room.id, "Ally", "ALICE@example.com"),
        &key,
        &db,
    )
    .await;
    assert!(matches!(same_email, Err(WriteError::DuplicateEmail)));

    // the same person may join a different room
    ParticipantRecord::create(&new_participant(*other.id, "Alice", "alice@example.com"), &key, &db)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_participant_needs_a_room() {
    let db = setup_test_db().await;
    let missing = Uuid::new_v4();

    let result = ParticipantRecord::create(
        &new_participant(missing, "Alice", "alice@example.com"),
        &test_key(),
        &db,
    )
    .await;

    assert!(matches!(result, Err(WriteError::RoomNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_participants_listed_in_enrollment_order() {
    let db = setup_test_db().await;
    let key = test_key();
    let room = RoomRecord::create(&new_room("office", OffsetDateTime::now_utc()), &db)
        .await
        .unwrap();

    for name in ["Carol", "Alice", "Bob"] {
        let email = format!("{}@example.com", name.to_lowercase());
        ParticipantRecord::create(&new_participant(*room.id, name, &email), &key, &db)
            .await
            .unwrap();
    }

    let names: Vec<String> = db
        .list_participants(*room.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
}

#[tokio::test]
async fn test_list_participants_of_missing_room() {
    let db = setup_test_db().await;
    let missing = Uuid::new_v4();

    let result = db.list_participants(missing).await;
    assert!(matches!(result, Err(RoomStoreError::RoomNotFound(id)) if id == missing));

    // an existing room with nobody in it is just empty
    let room = RoomRecord::create(&new_room("empty", OffsetDateTime::now_utc()), &db)
        .await
        .unwrap();
    assert!(db.list_participants(*room.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_draw_completed_is_compare_and_set() {
    let db = setup_test_db().await;
    let room = RoomRecord::create(&new_room("office", OffsetDateTime::now_utc()), &db)
        .await
        .unwrap();

    db.mark_draw_completed(*room.id).await.unwrap();
    assert!(RoomRecord::get(*room.id, &db).await.unwrap().unwrap().draw_completed);

    let second = db.mark_draw_completed(*room.id).await;
    assert!(matches!(second, Err(RoomStoreError::AlreadyDrawn(id)) if id == *room.id));

    let missing = Uuid::new_v4();
    let result = db.mark_draw_completed(missing).await;
    assert!(matches!(result, Err(RoomStoreError::RoomNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_on_disk_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    let db_url = url::Url::parse(&format!("sqlite://{}", path.display())).unwrap();

    let room_id = {
        let db = Database::connect(&db_url).await.unwrap();
        let room = RoomRecord::create(&new_room("office", OffsetDateTime::now_utc()), &db)
            .await
            .unwrap();
        db.mark_draw_completed(*room.id).await.unwrap();
        db.close().await;
        *room.id
    };

    // reconnecting reruns migrations without touching the data
    let db = Database::connect(&db_url).await.unwrap();
    let room = RoomRecord::get(room_id, &db).await.unwrap().unwrap();
    assert!(room.draw_completed);
}
