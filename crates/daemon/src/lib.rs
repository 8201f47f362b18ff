/**
 * SQLite storage for rooms and participants,
 *  and the draw engine's `RoomStore` over it.
 */
pub mod database;
/**
 * Status HTTP server: liveness, readiness
 *  and build version.
 */
pub mod http_server;
/**
 * Concrete notification transports
 *  selected by configuration.
 */
pub mod notifier;
/**
 * Process lifecycle: logging, signals,
 *  task supervision and graceful shutdown.
 */
pub mod process;
pub mod service_config;
pub mod service_state;

// App state (configuration, paths, key)
pub mod state;

pub use database::Database;
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
pub use state::{AppConfig, AppState, StateError};
