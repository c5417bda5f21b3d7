//! Notification models.
//!
//! Covers the notification kinds the dispatcher understands and the
//! append-only history of delivery attempts kept per ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// Channel Kind Enum
// =============================================================================

/// Delivery channel for customer notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Whatsapp,
    Email,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Whatsapp => write!(f, "whatsapp"),
            ChannelKind::Email => write!(f, "email"),
        }
    }
}

// =============================================================================
// Notification Kind
// =============================================================================

/// What a notification is about.
///
/// This is a closed set: an unrecognized kind fails deserialization with a
/// 400 instead of silently falling back to a status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// Channel check requested by staff; carries no repair progress
    Test,
    /// The ticket moved to a new status
    StatusUpdated,
    /// The device is repaired and ready for pickup
    RepairCompleted,
    /// Free-form staff message about the ticket
    Custom { message: String },
}

impl NotificationKind {
    /// Wire name, used for history rows and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Test => "test",
            NotificationKind::StatusUpdated => "status_updated",
            NotificationKind::RepairCompleted => "repair_completed",
            NotificationKind::Custom { .. } => "custom",
        }
    }
}

// =============================================================================
// Notification History Model
// =============================================================================

/// One delivery attempt on one channel (audit log, append-only)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NotificationRecord {
    pub id: i64,
    pub repair_id: Uuid,
    pub channel: ChannelKind,
    pub kind: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
