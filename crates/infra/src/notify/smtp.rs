//! SMTP notifier using Lettre.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;

use super::{NewRequestNotice, Notifier, NotifierError};

/// Sends each notice as a plain-text email through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// # Errors
    ///
    /// Returns an error if an address does not parse or the relay host is
    /// not usable for TLS.
    pub fn new(settings: &SmtpSettings, from: &str, to: &str) -> Result<Self, NotifierError> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| NotifierError::Config(format!("sender `{from}`: {e}")))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| NotifierError::Config(format!("recipient `{to}`: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| NotifierError::Config(format!("SMTP relay error: {e}")))?
            .port(settings.port);
        if let Some((username, password)) = settings.credentials() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, notice: &NewRequestNotice) -> Result<(), NotifierError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notice.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())
            .map_err(|e| NotifierError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;
        Ok(())
    }
}
