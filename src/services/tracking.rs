//! Public repair tracking.
//!
//! Unauthenticated lookup by ticket number, phone number, or email. The
//! raw token is classified first so a lookup never searches more than one
//! field, and results are reduced to the sanitized customer-facing
//! summary before leaving the service.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{RepairSummary, RepairTicket};
use crate::services::repair::{ContactQuery, RepairStore};

/// Shortest digit count accepted as a phone lookup; anything shorter is
/// treated as a malformed token rather than searched
const MIN_PHONE_DIGITS: usize = 7;

// =============================================================================
// Token Classification
// =============================================================================

/// Classified shape of a raw tracking token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingToken {
    TicketNumber(String),
    Email(String),
    Phone(String),
}

impl TrackingToken {
    /// Classifies a raw token.
    ///
    /// Ticket numbers win over everything ("TKT-" prefix plus digits, any
    /// case), email shapes come next, and anything with enough digits is
    /// treated as a phone number. Tokens with no usable shape are rejected
    /// as a validation error.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Tracking token is required".to_string()));
        }

        if let Some(number) = ticket_number_shape(token) {
            return Ok(TrackingToken::TicketNumber(number));
        }

        if email_shape(token) {
            return Ok(TrackingToken::Email(token.to_lowercase()));
        }

        let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= MIN_PHONE_DIGITS {
            return Ok(TrackingToken::Phone(digits));
        }

        Err(AppError::Validation(
            "Tracking token must be a ticket number, email, or phone number".to_string(),
        ))
    }
}

/// "TKT-000123" in any case becomes the canonical upper-case ticket number
fn ticket_number_shape(token: &str) -> Option<String> {
    let upper = token.to_uppercase();
    let digits = upper.strip_prefix("TKT-")?;

    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(upper)
    } else {
        None
    }
}

/// Loose email check, enough to route the lookup (not an address validator)
fn email_shape(token: &str) -> bool {
    let Some(at) = token.find('@') else {
        return false;
    };

    let local = &token[..at];
    let domain = &token[at + 1..];

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

// =============================================================================
// Tracking Service
// =============================================================================

/// Public tracking read path
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn RepairStore>,
}

impl TrackingService {
    pub fn new(store: Arc<dyn RepairStore>) -> Self {
        Self { store }
    }

    /// Finds repairs trackable with `token` and returns sanitized summaries.
    ///
    /// No match is an empty list, not an error; only a malformed token is.
    pub async fn find_trackable(&self, token: &str) -> AppResult<Vec<RepairSummary>> {
        let repairs: Vec<RepairTicket> = match TrackingToken::parse(token)? {
            TrackingToken::TicketNumber(number) => self
                .store
                .find_by_ticket_number(&number)
                .await?
                .into_iter()
                .collect(),
            TrackingToken::Email(email) => {
                self.store
                    .find_by_contact(&ContactQuery::Email(email))
                    .await?
            }
            TrackingToken::Phone(digits) => {
                self.store
                    .find_by_contact(&ContactQuery::Phone(digits))
                    .await?
            }
        };

        let mut summaries = Vec::with_capacity(repairs.len());
        for repair in &repairs {
            // A dangling store reference hides that ticket rather than
            // failing the whole lookup.
            match self.store.store_by_id(repair.store_id).await? {
                Some(store) => summaries.push(repair.to_summary(&store)),
                None => {
                    log::warn!(
                        "Repair {} references missing store {}; hidden from tracking",
                        repair.ticket_number,
                        repair.store_id
                    );
                }
            }
        }

        Ok(summaries)
    }
}
