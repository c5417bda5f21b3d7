use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Store (branch) model.
///
/// Every ticket is attributed to a store; store name, address, and contact
/// data appear in customer messages and the public tracking view, and the
/// store currency drives cost formatting.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    /// Short branch code used in internal references
    pub code: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub manager_name: Option<String>,
    /// ISO 4217 code, e.g. "EUR"
    pub currency: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
