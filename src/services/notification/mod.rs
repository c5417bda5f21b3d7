//! Customer notification dispatch.
//!
//! Fans one notification out to every eligible channel (WhatsApp, email),
//! collects a per-channel outcome, and reports overall success when at
//! least one attempted channel went through. Channel failures never escape
//! the dispatcher; callers persist the outcomes onto the ticket's
//! notification history instead of reacting to exceptions.

pub mod email;
pub mod templates;
pub mod whatsapp;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Customer, NotificationKind, RepairTicket, Store};

pub use email::SmtpMailer;
pub use templates::RenderedMessage;
pub use whatsapp::WhatsAppClient;

// =============================================================================
// Channel Errors & Receipts
// =============================================================================

/// Failure of a single channel send.
///
/// These never propagate past the dispatcher; they are folded into the
/// per-channel outcome.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Credentials for the channel were never provided; permanent for the
    /// lifetime of the process
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),

    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("provider request timed out")]
    Timeout,

    #[error("{0}")]
    Provider(String),
}

/// Identifier handed back by a provider for an accepted message
#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    pub message_id: String,
}

// =============================================================================
// Channel Client Traits
// =============================================================================

/// Messaging gateway client (the WhatsApp side of a dispatch)
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Sends a plain-text message to `to`
    async fn send(&self, to: &str, body: &str) -> Result<ProviderReceipt, ChannelError>;
}

/// Email delivery client (the email side of a dispatch)
#[async_trait]
pub trait MailChannel: Send + Sync {
    /// Sends an HTML email to `to`
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<ProviderReceipt, ChannelError>;
}

// =============================================================================
// Dispatch Outcome
// =============================================================================

/// Result of one channel within a dispatch
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
    /// Whether the channel was eligible and a send was tried
    pub attempted: bool,
    /// Whether the provider accepted the message
    pub success: bool,
    /// Provider message id, kept for the audit trail
    pub provider_id: Option<String>,
    /// Failure detail; logged and stored, never shown to customers
    pub error: Option<String>,
}

impl ChannelOutcome {
    /// Channel was not eligible; nothing was sent
    pub fn skipped() -> Self {
        Self {
            attempted: false,
            success: false,
            provider_id: None,
            error: None,
        }
    }

    /// Provider accepted the message
    pub fn delivered(provider_id: String) -> Self {
        Self {
            attempted: true,
            success: true,
            provider_id: Some(provider_id),
            error: None,
        }
    }

    /// Send was tried and failed
    pub fn failed(error: String) -> Self {
        Self {
            attempted: true,
            success: false,
            provider_id: None,
            error: Some(error),
        }
    }
}

/// Aggregated outcome of a dispatch across both channels.
///
/// `success` is true when at least one attempted channel succeeded;
/// partial delivery still means the customer was informed.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResult {
    pub success: bool,
    pub whatsapp: ChannelOutcome,
    pub email: ChannelOutcome,
}

impl NotificationResult {
    /// Neither channel was attempted (missing inputs or no eligible contact)
    pub fn not_attempted() -> Self {
        Self {
            success: false,
            whatsapp: ChannelOutcome::skipped(),
            email: ChannelOutcome::skipped(),
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Multi-channel notification dispatcher
pub struct Notifier {
    messages: Arc<dyn MessageChannel>,
    mail: Arc<dyn MailChannel>,
}

impl Notifier {
    pub fn new(messages: Arc<dyn MessageChannel>, mail: Arc<dyn MailChannel>) -> Self {
        Self { messages, mail }
    }

    /// Dispatches one notification to every eligible channel.
    ///
    /// A missing repair, customer, or store (a dangling reference in the
    /// record store) short-circuits with nothing attempted; no channel
    /// client is called in that case. Channel eligibility requires a usable
    /// address plus the ticket's consent flag. The two sends run
    /// concurrently and fail independently; this function never errors.
    pub async fn notify(
        &self,
        repair: Option<&RepairTicket>,
        customer: Option<&Customer>,
        store: Option<&Store>,
        kind: &NotificationKind,
    ) -> NotificationResult {
        let (Some(repair), Some(customer), Some(store)) = (repair, customer, store) else {
            log::warn!("Notification dispatch called with missing records; nothing sent");
            return NotificationResult::not_attempted();
        };

        // Consent is an explicit gate, never inferred from the presence of
        // a contact address.
        let consent = repair.contact.notify_consent;
        let whatsapp_to = repair.contact.whatsapp_number.as_deref().filter(|_| consent);
        let email_to = repair
            .contact
            .notification_email
            .as_deref()
            .or(customer.email.as_deref())
            .filter(|_| consent);

        if whatsapp_to.is_none() && email_to.is_none() {
            log::info!(
                "No eligible channel for repair {} ({})",
                repair.ticket_number,
                kind.as_str()
            );
            return NotificationResult::not_attempted();
        }

        // Rendered once, shared by both channels
        let message = templates::render(kind, repair, customer, store);

        let whatsapp_fut = async {
            match whatsapp_to {
                Some(to) => match self.messages.send(to, &message.whatsapp_text).await {
                    Ok(receipt) => ChannelOutcome::delivered(receipt.message_id),
                    Err(e) => {
                        log::warn!(
                            "WhatsApp send failed for repair {}: {}",
                            repair.ticket_number,
                            e
                        );
                        ChannelOutcome::failed(e.to_string())
                    }
                },
                None => ChannelOutcome::skipped(),
            }
        };

        let email_fut = async {
            match email_to {
                Some(to) => match self
                    .mail
                    .send(to, &message.email_subject, &message.email_html)
                    .await
                {
                    Ok(receipt) => ChannelOutcome::delivered(receipt.message_id),
                    Err(e) => {
                        log::warn!(
                            "Email send failed for repair {}: {}",
                            repair.ticket_number,
                            e
                        );
                        ChannelOutcome::failed(e.to_string())
                    }
                },
                None => ChannelOutcome::skipped(),
            }
        };

        let (whatsapp, email) = tokio::join!(whatsapp_fut, email_fut);

        NotificationResult {
            success: whatsapp.success || email.success,
            whatsapp,
            email,
        }
    }
}
