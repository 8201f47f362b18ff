use std::convert::Infallible;

use async_trait::async_trait;

use common::notify::{Notification, Notifier};

/// Logs each notification instead of delivering it
///
/// Only the room and the giver's name are logged; the address and the
/// giftee never are.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    type Error = Infallible;

    async fn notify(&self, notification: &Notification) -> Result<(), Self::Error> {
        tracing::info!(
            room_id = %notification.room_id,
            giver = %notification.giver_name,
            "draw notification produced"
        );
        Ok(())
    }
}
