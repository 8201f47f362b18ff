use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::crypto::PiiKey;
use common::draw::{DrawScheduler, SchedulerConfig};

use crate::database::{Database, DatabaseSetupError};
use crate::notifier::{AnyNotifier, WebhookError};
use crate::service_config::Config;

pub type Scheduler = DrawScheduler<Database, AnyNotifier>;

/// Shared handles for the running daemon
#[derive(Clone)]
pub struct State {
    database: Database,
    scheduler: Arc<Scheduler>,
    shutting_down: Arc<AtomicBool>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        tracing::info!(database_url = %config.database_url, "connecting to database");
        let database = Database::connect(&config.database_url).await?;

        // 2. Setup notifier
        let notifier = AnyNotifier::from_config(&config.notifier)?;
        tracing::info!(notifier = notifier.kind(), "notifier configured");

        // 3. Build the scheduler; it is started by the process supervisor
        let scheduler = Arc::new(DrawScheduler::new(
            database.clone(),
            notifier,
            config.pii_key.clone(),
            config.scheduler.clone(),
        ));

        Ok(Self {
            database,
            scheduler,
            shutting_down: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Assemble state from parts already built, e.g. in tests
    pub fn new(
        database: Database,
        notifier: AnyNotifier,
        key: PiiKey,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let scheduler = Arc::new(DrawScheduler::new(
            database.clone(),
            notifier,
            key,
            scheduler_config,
        ));
        Self {
            database,
            scheduler,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn mark_shutting_down(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        &self.database
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("notifier setup error: {0}")]
    NotifierSetupError(#[from] WebhookError),
}
