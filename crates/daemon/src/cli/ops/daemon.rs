use clap::Args;

use santa_daemon::state::AppState;
use santa_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override status server port (default from config)
    #[arg(long)]
    pub status_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] santa_daemon::state::StateError),

    #[error("daemon failed: {0}")]
    Failed(#[from] santa_daemon::process::ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;

        // key and database URL are resolved here so a bad key stops us
        // before anything starts
        let mut config = ServiceConfig::from_state(&state)?;
        if let Some(port) = self.status_port {
            config.status_port = port;
        }
        config.log_dir = self.log_dir.clone();

        spawn_service(&config).await?;
        Ok("daemon ended".to_string())
    }
}
