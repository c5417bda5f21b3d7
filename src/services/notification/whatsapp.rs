//! WhatsApp channel client.
//!
//! Talks to a WhatsApp Business gateway over HTTP: bearer-token auth, one
//! JSON POST per message, provider message id taken from the response
//! body. A client built without gateway credentials stays permanently
//! unconfigured and fails every send with a configuration error instead of
//! reaching the network.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{ChannelError, MessageChannel, ProviderReceipt};
use crate::config::WhatsAppGatewayConfig;

/// WhatsApp Business gateway client
pub struct WhatsAppClient {
    config: Option<WhatsAppGatewayConfig>,
    client: reqwest::Client,
}

impl WhatsAppClient {
    /// Creates a client; `config: None` leaves the channel unconfigured
    pub fn new(config: Option<WhatsAppGatewayConfig>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Gateway endpoint for sending messages from the configured number
    fn endpoint(config: &WhatsAppGatewayConfig) -> String {
        format!(
            "{}/{}/messages",
            config.api_url.trim_end_matches('/'),
            config.sender_id
        )
    }

    /// Digits-only destination, the only form the gateway accepts
    fn normalize_number(to: &str) -> String {
        to.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    fn message_body(to: &str, body: &str) -> serde_json::Value {
        json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": body
            }
        })
    }
}

#[async_trait]
impl MessageChannel for WhatsAppClient {
    async fn send(&self, to: &str, body: &str) -> Result<ProviderReceipt, ChannelError> {
        let config = self
            .config
            .as_ref()
            .ok_or(ChannelError::NotConfigured("WhatsApp"))?;

        let number = Self::normalize_number(to);
        if number.is_empty() {
            return Err(ChannelError::InvalidRecipient(to.to_string()));
        }

        let response = self
            .client
            .post(Self::endpoint(config))
            .bearer_auth(&config.access_token)
            .json(&Self::message_body(&number, body))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::Timeout
                } else if e.is_connect() {
                    ChannelError::Provider("connection to WhatsApp gateway failed".to_string())
                } else {
                    ChannelError::Provider(format!("WhatsApp request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = if error_body.is_empty() {
                format!("WhatsApp gateway returned HTTP {}", status.as_u16())
            } else {
                format!(
                    "WhatsApp gateway returned HTTP {}: {}",
                    status.as_u16(),
                    error_body
                )
            };
            return Err(ChannelError::Provider(message));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChannelError::Provider(format!("unreadable gateway response: {}", e)))?;

        let message_id = payload
            .pointer("/messages/0/id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(ProviderReceipt { message_id })
    }
}
