//! In-memory record store for tests
//!
//! Implements the same contract as the Postgres store: case-insensitive
//! ticket lookup, normalized contact matching with customer fallback,
//! monotonic notified flags, and newest-first history.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use servitrak::error::{AppError, AppResult};
use servitrak::models::{
    ChannelKind, Customer, NotificationKind, NotificationRecord, RepairStatus, RepairTicket, Store,
};
use servitrak::services::notification::ChannelOutcome;
use servitrak::services::repair::{ContactQuery, RepairStore};

#[derive(Default)]
pub struct MemoryStore {
    repairs: Mutex<HashMap<Uuid, RepairTicket>>,
    customers: Mutex<HashMap<Uuid, Customer>>,
    stores: Mutex<HashMap<Uuid, Store>>,
    history: Mutex<Vec<NotificationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_repair(&self, repair: RepairTicket) {
        self.repairs.lock().unwrap().insert(repair.id, repair);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.customers.lock().unwrap().insert(customer.id, customer);
    }

    pub fn insert_store(&self, store: Store) {
        self.stores.lock().unwrap().insert(store.id, store);
    }

    /// Snapshot of a ticket for assertions
    pub fn repair(&self, id: Uuid) -> Option<RepairTicket> {
        self.repairs.lock().unwrap().get(&id).cloned()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    pub fn history_rows(&self) -> Vec<NotificationRecord> {
        self.history.lock().unwrap().clone()
    }
}

fn digits_match(value: Option<&str>, digits: &str) -> bool {
    let normalized: String = value
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    !normalized.is_empty() && normalized == digits
}

fn email_match(value: Option<&str>, email: &str) -> bool {
    value.map(|v| v.to_lowercase() == email).unwrap_or(false)
}

#[async_trait]
impl RepairStore for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<RepairTicket> {
        self.repairs
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Repair {} not found", id)))
    }

    async fn find_by_ticket_number(
        &self,
        ticket_number: &str,
    ) -> AppResult<Option<RepairTicket>> {
        Ok(self
            .repairs
            .lock()
            .unwrap()
            .values()
            .find(|r| r.ticket_number.eq_ignore_ascii_case(ticket_number))
            .cloned())
    }

    async fn find_by_contact(&self, query: &ContactQuery) -> AppResult<Vec<RepairTicket>> {
        let customers = self.customers.lock().unwrap();

        let mut matches: Vec<RepairTicket> = self
            .repairs
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                let customer = customers.get(&r.customer_id);
                match query {
                    ContactQuery::Phone(digits) => {
                        digits_match(r.contact.whatsapp_number.as_deref(), digits)
                            || customer
                                .map(|c| digits_match(c.phone.as_deref(), digits))
                                .unwrap_or(false)
                    }
                    ContactQuery::Email(email) => {
                        email_match(r.contact.notification_email.as_deref(), email)
                            || customer
                                .map(|c| email_match(c.email.as_deref(), email))
                                .unwrap_or(false)
                    }
                }
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(matches)
    }

    async fn update_status(&self, id: Uuid, status: RepairStatus) -> AppResult<RepairTicket> {
        let mut repairs = self.repairs.lock().unwrap();
        let repair = repairs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Repair {} not found", id)))?;

        repair.status = status;
        if status == RepairStatus::Completed {
            repair.completed_at = Some(Utc::now());
        }
        repair.updated_at = Utc::now();

        Ok(repair.clone())
    }

    async fn append_notification_record(
        &self,
        id: Uuid,
        channel: ChannelKind,
        kind: &NotificationKind,
        outcome: &ChannelOutcome,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        {
            let mut repairs = self.repairs.lock().unwrap();
            let repair = repairs
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Repair {} not found", id)))?;

            match channel {
                ChannelKind::Whatsapp => {
                    repair.whatsapp_notified = repair.whatsapp_notified || outcome.success;
                }
                ChannelKind::Email => {
                    repair.email_notified = repair.email_notified || outcome.success;
                }
            }
            if outcome.success {
                repair.last_notified_at = Some(at);
            }
            repair.updated_at = at;
        }

        let mut history = self.history.lock().unwrap();
        let record = NotificationRecord {
            id: history.len() as i64 + 1,
            repair_id: id,
            channel,
            kind: kind.as_str().to_string(),
            success: outcome.success,
            provider_message_id: outcome.provider_id.clone(),
            error_message: outcome.error.clone(),
            created_at: at,
        };
        history.push(record);

        Ok(())
    }

    async fn notification_history(
        &self,
        repair_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<NotificationRecord>> {
        let mut rows: Vec<NotificationRecord> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.repair_id == repair_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn customer_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.customers.lock().unwrap().get(&id).cloned())
    }

    async fn store_by_id(&self, id: Uuid) -> AppResult<Option<Store>> {
        Ok(self.stores.lock().unwrap().get(&id).cloned())
    }
}
