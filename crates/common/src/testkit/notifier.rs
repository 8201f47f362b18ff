use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::notify::{Notification, Notifier};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingNotifierError {
    #[error("simulated delivery failure for {0}")]
    Rejected(String),
}

/// A notifier that records every notification it is asked to send
///
/// Sends to givers listed with [`RecordingNotifier::failing_for`] fail
/// (and are recorded as attempts only). An optional delay makes every
/// send take that long, for timeout and overlap tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<RecordingNotifierInner>>,
}

#[derive(Debug, Default)]
struct RecordingNotifierInner {
    attempts: Vec<Notification>,
    sent: Vec<Notification>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send addressed to one of `giver_names`
    pub fn failing_for(self, giver_names: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock();
            inner
                .failing
                .extend(giver_names.iter().map(|name| name.to_string()));
        }
        self
    }

    /// Sleep for `delay` before completing every send
    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.lock().delay = Some(delay);
        self
    }

    /// Every notification handed to the notifier, successful or not
    pub fn attempts(&self) -> Vec<Notification> {
        self.inner.lock().attempts.clone()
    }

    /// Notifications that were delivered
    pub fn sent(&self) -> Vec<Notification> {
        self.inner.lock().sent.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    type Error = RecordingNotifierError;

    async fn notify(&self, notification: &Notification) -> Result<(), Self::Error> {
        let (delay, rejected) = {
            let mut inner = self.inner.lock();
            inner.attempts.push(notification.clone());
            (
                inner.delay,
                inner.failing.contains(&notification.giver_name),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if rejected {
            return Err(RecordingNotifierError::Rejected(
                notification.giver_name.clone(),
            ));
        }

        self.inner.lock().sent.push(notification.clone());
        Ok(())
    }
}
