//! Email channel client.
//!
//! Sends HTML notifications over SMTP using the lettre crate. Port 465
//! uses implicit TLS (SMTPS); every other port starts plain and upgrades
//! via STARTTLS. Credentials are optional for relays that accept
//! unauthenticated submission. A client built without SMTP configuration
//! stays permanently unconfigured and fails every send with a
//! configuration error.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::{ChannelError, MailChannel, ProviderReceipt};
use crate::config::SmtpConfig;

/// SMTP email client
pub struct SmtpMailer {
    config: Option<SmtpConfig>,
    timeout: Duration,
}

impl SmtpMailer {
    /// Creates a mailer; `config: None` leaves the channel unconfigured
    pub fn new(config: Option<SmtpConfig>, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    /// Builds the SMTP transport for the configured relay
    fn transport(
        &self,
        config: &SmtpConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelError> {
        let builder = if config.port == 465 {
            // Implicit TLS for port 465
            let tls_params =
                lettre::transport::smtp::client::TlsParameters::new(config.host.clone()).map_err(
                    |e| ChannelError::Provider(format!("Invalid TLS parameters: {}", e)),
                )?;

            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| ChannelError::Provider(format!("Invalid SMTP host: {}", e)))?
                .port(config.port)
                .tls(lettre::transport::smtp::client::Tls::Wrapper(tls_params))
        } else {
            // STARTTLS everywhere else (starts plain, upgrades to TLS)
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| ChannelError::Provider(format!("Invalid SMTP host: {}", e)))?
                .port(config.port)
        };

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.timeout(Some(self.timeout)).build())
    }

    /// Message-ID we assign to the outgoing mail; the same value is handed
    /// back as the provider id for the notification history
    fn generate_message_id(config: &SmtpConfig) -> String {
        let domain = config
            .from_address
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or("servitrak.local");

        format!("<{}@{}>", Uuid::new_v4().simple(), domain)
    }
}

#[async_trait]
impl MailChannel for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<ProviderReceipt, ChannelError> {
        let config = self
            .config
            .as_ref()
            .ok_or(ChannelError::NotConfigured("email"))?;

        let to_address: Mailbox = to
            .parse()
            .map_err(|_| ChannelError::InvalidRecipient(to.to_string()))?;
        let from_address: Mailbox = config.from_address.parse().map_err(|_| {
            ChannelError::Provider(format!("Invalid sender address: {}", config.from_address))
        })?;

        let message_id = Self::generate_message_id(config);

        let email = Message::builder()
            .from(from_address)
            .to(to_address)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| ChannelError::Provider(format!("Failed to build email: {}", e)))?;

        let mailer = self.transport(config)?;

        mailer
            .send(email)
            .await
            .map_err(|e| ChannelError::Provider(format!("SMTP delivery failed: {}", e)))?;

        log::debug!("Email accepted by relay for {}", to);

        Ok(ProviderReceipt { message_id })
    }
}
