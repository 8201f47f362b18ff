use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::DatabaseSetupError;

fn is_memory(url: &url::Url) -> bool {
    url.as_str().contains(":memory:")
}

pub async fn connect_sqlite(url: &url::Url) -> Result<SqlitePool, DatabaseSetupError> {
    let options = SqliteConnectOptions::from_str(url.as_str())?
        .create_if_missing(true)
        .foreign_keys(true);

    if is_memory(url) {
        // every connection to :memory: opens its own database, so pin one
        return SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(DatabaseSetupError::Unavailable);
    }

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options.journal_mode(SqliteJournalMode::Wal))
        .await
        .map_err(DatabaseSetupError::Unavailable)
}

pub async fn migrate_sqlite(pool: &SqlitePool) -> Result<(), DatabaseSetupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
