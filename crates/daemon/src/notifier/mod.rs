//! Notification transports the daemon can send draw results through

mod log;
mod webhook;

pub use log::LogNotifier;
pub use webhook::{WebhookError, WebhookNotifier, WebhookPayload};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use common::notify::{Notification, Notifier};

/// The `[notifier]` table of `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Log that each message was produced, without sending anything
    #[default]
    Log,
    /// POST each message as JSON to `url`
    Webhook {
        url: Url,
        /// Sent as `Authorization: Bearer <token>` when set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearer_token: Option<String>,
    },
}

/// The transport selected by configuration
#[derive(Debug, Clone)]
pub enum AnyNotifier {
    Log(LogNotifier),
    Webhook(WebhookNotifier),
}

impl AnyNotifier {
    pub fn from_config(config: &NotifierConfig) -> Result<Self, WebhookError> {
        match config {
            NotifierConfig::Log => Ok(Self::Log(LogNotifier)),
            NotifierConfig::Webhook { url, bearer_token } => Ok(Self::Webhook(
                WebhookNotifier::new(url.clone(), bearer_token.clone())?,
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Webhook(_) => "webhook",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

#[async_trait]
impl Notifier for AnyNotifier {
    type Error = NotifierError;

    async fn notify(&self, notification: &Notification) -> Result<(), Self::Error> {
        match self {
            Self::Log(notifier) => match notifier.notify(notification).await {
                Ok(()) => Ok(()),
                Err(never) => match never {},
            },
            Self::Webhook(notifier) => Ok(notifier.notify(notification).await?),
        }
    }
}
