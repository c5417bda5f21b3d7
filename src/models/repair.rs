//! Repair ticket models.
//!
//! A repair ticket tracks one device through the shop: intake, diagnosis,
//! the repair itself, and handover back to the customer. Tickets reference
//! the owning customer and the store handling the work by id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::store::Store;

// =============================================================================
// Repair Status Enum
// =============================================================================

/// Lifecycle state of a repair ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Received,
    Diagnosed,
    InRepair,
    Completed,
    Delivered,
    Cancelled,
}

impl RepairStatus {
    /// Customer-facing display name ("in_repair" becomes "In Repair")
    pub fn display_name(&self) -> &'static str {
        match self {
            RepairStatus::Received => "Received",
            RepairStatus::Diagnosed => "Diagnosed",
            RepairStatus::InRepair => "In Repair",
            RepairStatus::Completed => "Completed",
            RepairStatus::Delivered => "Delivered",
            RepairStatus::Cancelled => "Cancelled",
        }
    }

    /// Progress percentage shown by tracking clients.
    ///
    /// These values are part of the public tracking contract; progress bars
    /// and printed slips depend on them staying exactly as they are.
    pub fn progress_percent(&self) -> u8 {
        match self {
            RepairStatus::Received => 20,
            RepairStatus::Diagnosed => 40,
            RepairStatus::InRepair => 60,
            RepairStatus::Completed => 80,
            RepairStatus::Delivered => 100,
            RepairStatus::Cancelled => 0,
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, RepairStatus::Delivered | RepairStatus::Cancelled)
    }
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairStatus::Received => write!(f, "received"),
            RepairStatus::Diagnosed => write!(f, "diagnosed"),
            RepairStatus::InRepair => write!(f, "in_repair"),
            RepairStatus::Completed => write!(f, "completed"),
            RepairStatus::Delivered => write!(f, "delivered"),
            RepairStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Priority Enum
// =============================================================================

/// Workshop priority of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

// =============================================================================
// Contact Preferences
// =============================================================================

/// Per-ticket notification contact data, captured at intake.
///
/// The WhatsApp number and notification email may differ from the owning
/// customer's records (a relative drops the device off, a work address is
/// preferred for this repair, and so on).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactPreferences {
    pub whatsapp_number: Option<String>,
    pub notification_email: Option<String>,
    /// Explicit opt-in to automated notifications
    #[serde(default = "default_true")]
    pub notify_consent: bool,
    pub consent_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Repair Ticket Model
// =============================================================================

/// Repair ticket model
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RepairTicket {
    pub id: Uuid,
    /// Human-friendly identifier printed on the intake slip ("TKT-000123")
    pub ticket_number: String,
    pub customer_id: Uuid,
    pub store_id: Uuid,
    pub device_type: String,
    pub device_brand: String,
    pub device_model: String,
    pub serial_number: Option<String>,
    pub issue_description: String,
    pub diagnosis: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub parts_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub status: RepairStatus,
    pub priority: Priority,
    #[sqlx(flatten)]
    pub contact: ContactPreferences,
    pub whatsapp_notified: bool,
    pub email_notified: bool,
    pub last_notified_at: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl RepairTicket {
    /// "Brand Model" device label used in messages and tracking
    pub fn device_label(&self) -> String {
        format!("{} {}", self.device_brand, self.device_model)
    }

    /// Customer-facing total: the final cost once set, otherwise the estimate
    pub fn customer_total(&self) -> Option<Decimal> {
        self.final_cost.or(self.estimated_cost)
    }

    /// Converts to the sanitized projection served by public tracking
    pub fn to_summary(&self, store: &Store) -> RepairSummary {
        RepairSummary {
            ticket_number: self.ticket_number.clone(),
            device_type: self.device_type.clone(),
            device: self.device_label(),
            status: self.status,
            progress_percent: self.status.progress_percent(),
            received_at: self.received_at,
            estimated_completion: self.estimated_completion,
            completed_at: self.completed_at,
            total_cost: self.customer_total(),
            store: StoreContact {
                name: store.name.clone(),
                phone: store.phone.clone(),
                whatsapp: store.whatsapp.clone(),
                address: store.address.clone(),
            },
        }
    }
}

// =============================================================================
// Public Tracking Projection
// =============================================================================

/// Customer-facing view of a ticket for the public tracking endpoint.
///
/// Deliberately excludes technician identity, internal diagnosis notes, and
/// the cost breakdown; customers see one total and the store to contact.
#[derive(Debug, Clone, Serialize)]
pub struct RepairSummary {
    pub ticket_number: String,
    pub device_type: String,
    pub device: String,
    pub status: RepairStatus,
    pub progress_percent: u8,
    pub received_at: DateTime<Utc>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_cost: Option<Decimal>,
    pub store: StoreContact,
}

/// Store contact block inside a tracking summary
#[derive(Debug, Clone, Serialize)]
pub struct StoreContact {
    pub name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: String,
}

// =============================================================================
// DTOs
// =============================================================================

/// Request body for a status change
#[derive(Debug, Deserialize)]
pub struct UpdateRepairStatus {
    pub status: RepairStatus,
}
