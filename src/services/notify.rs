use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use super::{Notification, NotificationScheduler, ServiceError};

/// Hands notifications to the log instead of a delivery channel, keeping a copy for inspection.
#[derive(Debug, Default)]
pub struct LoggingNotifier {
    scheduled: Mutex<Vec<Notification>>,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<Notification> {
        self.scheduled
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationScheduler for LoggingNotifier {
    async fn schedule(&self, notification: Notification) -> Result<(), ServiceError> {
        info!(
            kind = ?notification.kind,
            entity_kind = %notification.entity_kind,
            entity_id = %notification.entity_id,
            recipient = %notification.recipient,
            send_at = %notification.send_at,
            remind_at = ?notification.remind_at,
            "Notification scheduled"
        );
        self.scheduled
            .lock()
            .map_err(|_| ServiceError::Unavailable("notification log poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NotificationKind;
    use crate::workflows::status::EntityKind;
    use chrono::Utc;

    #[test]
    fn keeps_scheduled_notifications() {
        let notifier = LoggingNotifier::new();
        let notification = Notification {
            kind: NotificationKind::ReviewReady,
            entity_kind: EntityKind::EditingJob,
            entity_id: "ed-1".to_string(),
            recipient: "cl-1".to_string(),
            send_at: Utc::now(),
            remind_at: None,
        };

        tokio_test::block_on(notifier.schedule(notification.clone())).unwrap();
        assert_eq!(notifier.scheduled(), vec![notification]);
    }
}
