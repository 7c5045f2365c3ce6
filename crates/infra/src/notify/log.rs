//! Notifier that only logs (development, or when no SMTP relay is configured).

use tracing::info;

use super::{NewRequestNotice, Notifier, NotifierError};

#[derive(Clone, Debug)]
pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

impl Notifier for LogNotifier {
    async fn notify(&self, notice: &NewRequestNotice) -> Result<(), NotifierError> {
        info!(
            to = %self.recipient,
            request_id = %notice.request_id,
            subject = %notice.subject(),
            body = %notice.body(),
            "new request notification (log only)"
        );
        Ok(())
    }
}
