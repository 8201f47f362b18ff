use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::fs;

use serde::{Deserialize, Serialize};
use url::Url;

use common::crypto::PiiKey;
use common::draw::SchedulerConfig;

use crate::notifier::NotifierConfig;

pub const APP_NAME: &str = "santa";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const KEY_FILE_NAME: &str = "pii.key";

/// Base64 key that takes precedence over the key file
pub const KEY_ENV_VAR: &str = "SANTA_PII_KEY";
/// SQLite URL that takes precedence over the state directory's database
pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the status server (/_status/*)
    #[serde(default = "default_status_port")]
    pub status_port: u16,
    /// Default log directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

fn default_status_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            status_port: default_status_port(),
            log_level: default_log_level(),
            scheduler: SchedulerSection::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

/// The `[scheduler]` table, in whole seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub interval_secs: u64,
    pub align_to_interval: bool,
    pub tick_on_start: bool,
    pub store_timeout_secs: u64,
    pub send_timeout_secs: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let defaults = SchedulerConfig::default();
        Self {
            interval_secs: defaults.interval.as_secs(),
            align_to_interval: defaults.align_to_interval,
            tick_on_start: defaults.tick_on_start,
            store_timeout_secs: defaults.store_timeout.as_secs(),
            send_timeout_secs: defaults.send_timeout.as_secs(),
        }
    }
}

impl From<&SchedulerSection> for SchedulerConfig {
    fn from(section: &SchedulerSection) -> Self {
        SchedulerConfig {
            interval: Duration::from_secs(section.interval_secs.max(1)),
            align_to_interval: section.align_to_interval,
            tick_on_start: section.tick_on_start,
            store_timeout: Duration::from_secs(section.store_timeout_secs.max(1)),
            send_timeout: Duration::from_secs(section.send_timeout_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the santa directory (~/.santa)
    pub santa_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the base64 PII key
    pub key_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the santa directory path (custom or default ~/.santa)
    pub fn santa_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory with a fresh key
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let santa_dir = Self::santa_dir(custom_path)?;
        if santa_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&santa_dir)?;

        let key = PiiKey::generate().map_err(|e| StateError::InvalidKey(e.to_string()))?;
        let key_path = santa_dir.join(KEY_FILE_NAME);
        write_secret(&key_path, &key.to_base64())?;

        let config = config.unwrap_or_default();
        let config_path = santa_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        // the daemon creates the schema on first start
        let db_path = santa_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            santa_dir,
            db_path,
            key_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the santa directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let santa_dir = Self::santa_dir(custom_path)?;
        if !santa_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = santa_dir.join(DB_FILE_NAME);
        let key_path = santa_dir.join(KEY_FILE_NAME);
        let config_path = santa_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            santa_dir,
            db_path,
            key_path,
            config_path,
            config,
        })
    }

    /// Load the PII key from `SANTA_PII_KEY`, falling back to the key file
    pub fn load_key(&self) -> Result<PiiKey, StateError> {
        self.resolve_key(std::env::var(KEY_ENV_VAR).ok())
    }

    pub fn resolve_key(&self, from_env: Option<String>) -> Result<PiiKey, StateError> {
        let encoded = match from_env.filter(|v| !v.trim().is_empty()) {
            Some(encoded) => encoded,
            None if self.key_path.exists() => fs::read_to_string(&self.key_path)?,
            None => return Err(StateError::MissingFile(KEY_FILE_NAME.to_string())),
        };

        PiiKey::from_base64(&encoded).map_err(|e| StateError::InvalidKey(e.to_string()))
    }

    /// The database to connect to: `DATABASE_URL`, else the state directory's
    pub fn database_url(&self) -> Result<Url, StateError> {
        self.resolve_database_url(std::env::var(DATABASE_URL_ENV_VAR).ok())
    }

    pub fn resolve_database_url(&self, from_env: Option<String>) -> Result<Url, StateError> {
        let raw = match from_env.filter(|v| !v.trim().is_empty()) {
            Some(url) => url,
            None => format!("sqlite://{}", self.db_path.display()),
        };

        Url::parse(raw.trim()).map_err(|e| StateError::InvalidDatabaseUrl(format!("{raw}: {e}")))
    }
}

#[cfg(unix)]
fn write_secret(path: &Path, contents: &str) -> Result<(), StateError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_secret(path: &Path, contents: &str) -> Result<(), StateError> {
    fs::write(path, contents)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("santa directory not initialized. Run 'santa init' first")]
    NotInitialized,

    #[error("santa directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("invalid database url: {0}")]
    InvalidDatabaseUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
