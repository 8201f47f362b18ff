use std::path::PathBuf;

use url::Url;

use common::crypto::PiiKey;
use common::draw::SchedulerConfig;

use crate::notifier::NotifierConfig;
use crate::state::{AppState, StateError};

/// Everything the daemon needs to start, resolved from the state
/// directory, the environment and CLI flags
#[derive(Debug, Clone)]
pub struct Config {
    // data store configuration
    /// sqlite URL; `sqlite::memory:` for a throwaway database
    pub database_url: Url,

    /// key for participant addresses, decoded once at start-up
    pub pii_key: PiiKey,

    // draw configuration
    pub scheduler: SchedulerConfig,
    pub notifier: NotifierConfig,

    // http server configuration
    /// Port for the status server
    pub status_port: u16,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve a config from loaded state, honoring the environment overrides
    pub fn from_state(state: &AppState) -> Result<Self, StateError> {
        Ok(Self {
            database_url: state.database_url()?,
            pii_key: state.load_key()?,
            scheduler: SchedulerConfig::from(&state.config.scheduler),
            notifier: state.config.notifier.clone(),
            status_port: state.config.status_port,
            log_level: state.config.log_level()?,
            log_dir: None,
        })
    }
}
