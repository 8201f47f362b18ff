use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::notify::{Notification, Notifier};

/// JSON body POSTed for every notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub room_id: Uuid,
    pub room_name: String,
    /// The giver's address
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl From<&Notification> for WebhookPayload {
    fn from(notification: &Notification) -> Self {
        Self {
            room_id: notification.room_id,
            room_name: notification.room_name.clone(),
            to: notification.giver_email.clone(),
            subject: notification.subject(),
            body: notification.body(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("webhook responded with {0}")]
    HttpStatus(StatusCode),
}

/// Hands notifications to an HTTP endpoint, e.g. a mail relay
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl WebhookNotifier {
    pub fn new(url: Url, bearer_token: Option<String>) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .user_agent(concat!("santa/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url,
            bearer_token,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    type Error = WebhookError;

    async fn notify(&self, notification: &Notification) -> Result<(), Self::Error> {
        let mut request = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload::from(notification));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status));
        }

        tracing::debug!(room_id = %notification.room_id, %status, "webhook accepted notification");
        Ok(())
    }
}
