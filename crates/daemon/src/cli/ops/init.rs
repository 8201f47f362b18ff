use clap::Args;
use url::Url;

use santa_daemon::notifier::NotifierConfig;
use santa_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port for the status server
    #[arg(long)]
    pub status_port: Option<u16>,

    /// Deliver notifications by POSTing them to this URL instead of logging them
    #[arg(long)]
    pub webhook_url: Option<Url>,

    /// Bearer token sent with webhook requests
    #[arg(long, requires = "webhook_url")]
    pub webhook_token: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::default();
        if let Some(port) = self.status_port {
            config.status_port = port;
        }
        if let Some(url) = &self.webhook_url {
            config.notifier = NotifierConfig::Webhook {
                url: url.clone(),
                bearer_token: self.webhook_token.clone(),
            };
        }

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized santa directory at {}\n  config: {}\n  key:    {}\n  db:     {}",
            state.santa_dir.display(),
            state.config_path.display(),
            state.key_path.display(),
            state.db_path.display(),
        ))
    }
}
