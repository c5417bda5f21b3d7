//! Test fixtures and data builders
//!
//! Reusable repair/customer/store data plus recording channel doubles for
//! dispatcher tests. Timestamps are fixed so rendered output is stable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use servitrak::models::{
    ContactPreferences, Customer, CustomerType, Priority, RepairStatus, RepairTicket, Store,
};
use servitrak::services::notification::{
    ChannelError, MailChannel, MessageChannel, ProviderReceipt,
};

pub fn intake_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn sample_store() -> Store {
    Store {
        id: Uuid::new_v4(),
        name: "TechFix Central".to_string(),
        code: "CEN".to_string(),
        address: "Calle Mayor 12, Madrid".to_string(),
        phone: Some("+34 910 000 111".to_string()),
        email: Some("central@techfix.example".to_string()),
        whatsapp: Some("+34 600 111 222".to_string()),
        manager_name: None,
        currency: "EUR".to_string(),
        logo_url: None,
        created_at: intake_time(),
        updated_at: intake_time(),
    }
}

pub fn sample_customer() -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: "Maria Lopez".to_string(),
        email: Some("maria@example.com".to_string()),
        phone: Some("+34 612 345 678".to_string()),
        address: None,
        customer_type: CustomerType::Individual,
        loyalty_points: 120,
        created_at: intake_time(),
        updated_at: intake_time(),
    }
}

/// Builds repair tickets with sensible defaults
pub struct TicketBuilder {
    repair: RepairTicket,
}

impl Default for TicketBuilder {
    fn default() -> Self {
        Self {
            repair: RepairTicket {
                id: Uuid::new_v4(),
                ticket_number: "TKT-000123".to_string(),
                customer_id: Uuid::new_v4(),
                store_id: Uuid::new_v4(),
                device_type: "laptop".to_string(),
                device_brand: "Dell".to_string(),
                device_model: "XPS 13".to_string(),
                serial_number: Some("SN-9184".to_string()),
                issue_description: "Does not power on".to_string(),
                diagnosis: Some("Faulty power circuit on the motherboard".to_string()),
                estimated_cost: Some(Decimal::new(18950, 2)),
                parts_cost: None,
                labor_cost: None,
                final_cost: None,
                status: RepairStatus::Received,
                priority: Priority::Normal,
                contact: ContactPreferences {
                    whatsapp_number: Some("+34 612 345 678".to_string()),
                    notification_email: None,
                    notify_consent: true,
                    consent_at: None,
                },
                whatsapp_notified: false,
                email_notified: false,
                last_notified_at: None,
                received_at: intake_time(),
                estimated_completion: Some(Utc.with_ymd_and_hms(2025, 6, 5, 18, 0, 0).unwrap()),
                completed_at: None,
                updated_at: intake_time(),
            },
        }
    }
}

impl TicketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket_number(mut self, number: &str) -> Self {
        self.repair.ticket_number = number.to_string();
        self
    }

    pub fn with_customer(mut self, id: Uuid) -> Self {
        self.repair.customer_id = id;
        self
    }

    pub fn with_store(mut self, id: Uuid) -> Self {
        self.repair.store_id = id;
        self
    }

    pub fn with_status(mut self, status: RepairStatus) -> Self {
        self.repair.status = status;
        self
    }

    pub fn with_whatsapp(mut self, number: Option<&str>) -> Self {
        self.repair.contact.whatsapp_number = number.map(String::from);
        self
    }

    pub fn with_notification_email(mut self, email: Option<&str>) -> Self {
        self.repair.contact.notification_email = email.map(String::from);
        self
    }

    pub fn with_consent(mut self, consent: bool) -> Self {
        self.repair.contact.notify_consent = consent;
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: Option<&str>) -> Self {
        self.repair.diagnosis = diagnosis.map(String::from);
        self
    }

    pub fn with_final_cost(mut self, cost: Option<Decimal>) -> Self {
        self.repair.final_cost = cost;
        self
    }

    pub fn with_received_at(mut self, at: DateTime<Utc>) -> Self {
        self.repair.received_at = at;
        self
    }

    pub fn build(self) -> RepairTicket {
        self.repair
    }
}

// =============================================================================
// Recording Channel Doubles
// =============================================================================

enum SendMode {
    Succeed(&'static str),
    Fail(&'static str),
}

/// Message channel double that records every send
pub struct RecordingChannel {
    mode: SendMode,
    calls: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub fn succeeding(provider_id: &'static str) -> Self {
        Self {
            mode: SendMode::Succeed(provider_id),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &'static str) -> Self {
        Self {
            mode: SendMode::Fail(error),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Recorded (recipient, body) pairs
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn send(&self, to: &str, body: &str) -> Result<ProviderReceipt, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));

        match self.mode {
            SendMode::Succeed(id) => Ok(ProviderReceipt {
                message_id: id.to_string(),
            }),
            SendMode::Fail(msg) => Err(ChannelError::Provider(msg.to_string())),
        }
    }
}

/// Mail channel double that records every send
pub struct RecordingMailer {
    mode: SendMode,
    calls: AtomicUsize,
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub fn succeeding(provider_id: &'static str) -> Self {
        Self {
            mode: SendMode::Succeed(provider_id),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &'static str) -> Self {
        Self {
            mode: SendMode::Fail(error),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Recorded (recipient, subject, html) triples
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailChannel for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<ProviderReceipt, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));

        match self.mode {
            SendMode::Succeed(id) => Ok(ProviderReceipt {
                message_id: id.to_string(),
            }),
            SendMode::Fail(msg) => Err(ChannelError::Provider(msg.to_string())),
        }
    }
}

/// Polls `condition` until it holds or one second has passed.
///
/// Used to observe background notification tasks without sleeping a
/// fixed amount.
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
