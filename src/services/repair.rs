//! Repair record store seam and transition orchestration.
//!
//! `RepairStore` is the narrow persistence interface the core logic
//! depends on; `PgRepairStore` in `crate::db` implements it for production
//! and the test suite substitutes an in-memory store. `RepairService`
//! drives the state machine through the store and fires the notification
//! dispatcher without ever letting delivery outcome block or roll back a
//! durable status change.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ChannelKind, Customer, NotificationKind, NotificationRecord, RepairStatus, RepairTicket, Store,
};
use crate::services::lifecycle;
use crate::services::notification::{ChannelOutcome, NotificationResult, Notifier};

// =============================================================================
// Record Store Seam
// =============================================================================

/// Normalized contact lookup for the public tracking path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactQuery {
    /// Digits-only phone number
    Phone(String),
    /// Trimmed, lowercased email address
    Email(String),
}

/// Narrow persistence interface for repair tickets and their references
#[async_trait]
pub trait RepairStore: Send + Sync {
    /// Fetches a ticket; a missing id is a NotFound error
    async fn get_by_id(&self, id: Uuid) -> AppResult<RepairTicket>;

    /// Exact ticket-number lookup (case-insensitive) for public tracking
    async fn find_by_ticket_number(&self, ticket_number: &str)
        -> AppResult<Option<RepairTicket>>;

    /// Contact lookup for public tracking; matches the ticket's own contact
    /// data or the owning customer's
    async fn find_by_contact(&self, query: &ContactQuery) -> AppResult<Vec<RepairTicket>>;

    /// Persists a status change and returns the updated ticket
    async fn update_status(&self, id: Uuid, status: RepairStatus) -> AppResult<RepairTicket>;

    /// Appends one channel outcome to the ticket's notification history and
    /// refreshes the running notified flags
    async fn append_notification_record(
        &self,
        id: Uuid,
        channel: ChannelKind,
        kind: &NotificationKind,
        outcome: &ChannelOutcome,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Recent notification history for a ticket, newest first
    async fn notification_history(
        &self,
        repair_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<NotificationRecord>>;

    /// Referenced customer; `None` when the reference dangles
    async fn customer_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;

    /// Referenced store; `None` when the reference dangles
    async fn store_by_id(&self, id: Uuid) -> AppResult<Option<Store>>;
}

// =============================================================================
// Repair Service
// =============================================================================

/// Status transition orchestration over the record store
#[derive(Clone)]
pub struct RepairService {
    store: Arc<dyn RepairStore>,
    notifier: Arc<Notifier>,
}

impl RepairService {
    pub fn new(store: Arc<dyn RepairStore>, notifier: Arc<Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Applies a requested status change.
    ///
    /// The new status is durable once the store call returns; the triggered
    /// notification runs on a spawned task and its outcome never rolls the
    /// transition back.
    pub async fn update_status(
        &self,
        id: Uuid,
        requested: RepairStatus,
    ) -> AppResult<RepairTicket> {
        let repair = self.store.get_by_id(id).await?;
        let change = lifecycle::transition(repair.status, requested)?;

        let updated = self.store.update_status(id, change.to).await?;

        log::info!(
            "Repair {} moved {} -> {}",
            updated.ticket_number,
            change.from,
            change.to
        );

        if let Some(kind) = change.trigger {
            self.spawn_notification(updated.clone(), kind);
        }

        Ok(updated)
    }

    /// Sends a notification for a ticket right away and returns the
    /// per-channel outcome.
    ///
    /// Backs the staff-facing notify endpoint; status transitions dispatch
    /// on a background task through `update_status` instead.
    pub async fn send_notification(
        &self,
        id: Uuid,
        kind: NotificationKind,
    ) -> AppResult<NotificationResult> {
        let repair = self.store.get_by_id(id).await?;
        Self::dispatch(self.store.as_ref(), &self.notifier, &repair, &kind).await
    }

    /// Recent notification history for a ticket
    pub async fn notification_history(
        &self,
        id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<NotificationRecord>> {
        // 404 for unknown tickets rather than an empty list
        let repair = self.store.get_by_id(id).await?;
        self.store.notification_history(repair.id, limit).await
    }

    /// Fires the dispatcher for `repair` on a background task
    fn spawn_notification(&self, repair: RepairTicket, kind: NotificationKind) {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            match Self::dispatch(store.as_ref(), &notifier, &repair, &kind).await {
                Ok(result) if result.success => {
                    log::info!(
                        "Notified customer for repair {} ({})",
                        repair.ticket_number,
                        kind.as_str()
                    );
                }
                Ok(_) => {
                    log::warn!(
                        "No channel delivered for repair {} ({})",
                        repair.ticket_number,
                        kind.as_str()
                    );
                }
                Err(e) => {
                    log::error!(
                        "Failed to record notification for repair {}: {}",
                        repair.ticket_number,
                        e
                    );
                }
            }
        });
    }

    /// Resolves references, dispatches, and persists per-channel outcomes
    async fn dispatch(
        store: &dyn RepairStore,
        notifier: &Notifier,
        repair: &RepairTicket,
        kind: &NotificationKind,
    ) -> AppResult<NotificationResult> {
        let customer = store.customer_by_id(repair.customer_id).await?;
        let location = store.store_by_id(repair.store_id).await?;

        let result = notifier
            .notify(Some(repair), customer.as_ref(), location.as_ref(), kind)
            .await;

        // Skipped channels leave no history row; the history records
        // attempts, not eligibility decisions.
        let now = Utc::now();
        for (channel, outcome) in [
            (ChannelKind::Whatsapp, &result.whatsapp),
            (ChannelKind::Email, &result.email),
        ] {
            if outcome.attempted {
                store
                    .append_notification_record(repair.id, channel, kind, outcome, now)
                    .await?;
            }
        }

        Ok(result)
    }
}
