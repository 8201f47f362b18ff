pub mod models;
mod room_store;
mod sqlite;
mod types;

use std::ops::Deref;

use sqlx::SqlitePool;

pub use models::{NewParticipant, NewRoom, ParticipantRecord, RoomRecord, WriteError};
pub use types::DUuid;

/// SQLite-backed room storage
///
/// Cheap to clone; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Database(SqlitePool);

impl Database {
    /// Connect to `database_url` and bring the schema up to date
    ///
    /// `sqlite::memory:` gives a private in-memory database that lives as
    /// long as the returned handle.
    pub async fn connect(database_url: &url::Url) -> Result<Self, DatabaseSetupError> {
        if database_url.scheme() == "sqlite" {
            let db = sqlite::connect_sqlite(database_url).await?;
            sqlite::migrate_sqlite(&db).await?;
            return Ok(Database::new(db));
        }

        Err(DatabaseSetupError::UnknownDbType(
            database_url.scheme().to_string(),
        ))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self(pool)
    }

    /// Round trip a trivial query
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.0).await?;
        Ok(())
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("error occurred while attempting database migration: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    #[error("unable to perform initial connection and check of the database: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("requested database type was not recognized: {0}")]
    UnknownDbType(String),
}
