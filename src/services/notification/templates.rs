//! Notification message templates.
//!
//! Pure, deterministic rendering of the WhatsApp text and the email
//! subject/body for each notification kind. Everything shown comes from
//! the passed-in records; nothing here reads a clock, the environment, or
//! the database, so the same inputs always render byte-identical output.
//!
//! Optional fields render a readable placeholder instead of disappearing;
//! a customer should never see a hole where the diagnosis was meant to be.

use rust_decimal::Decimal;

use crate::models::{Customer, NotificationKind, RepairStatus, RepairTicket, Store};

/// Rendered content for one notification, shared by both channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub whatsapp_text: String,
    pub email_subject: String,
    pub email_html: String,
}

const NOT_SPECIFIED: &str = "Not specified";
const PENDING_DIAGNOSIS: &str = "Pending diagnosis";
const TO_BE_CONFIRMED: &str = "To be confirmed";

/// Header color when no status drives the accent
const DEFAULT_ACCENT: &str = "#2563eb";

/// Renders the message for `kind` from the given records
pub fn render(
    kind: &NotificationKind,
    repair: &RepairTicket,
    customer: &Customer,
    store: &Store,
) -> RenderedMessage {
    match kind {
        NotificationKind::Test => render_test(repair, customer, store),
        NotificationKind::StatusUpdated => render_status_updated(repair, customer, store),
        NotificationKind::RepairCompleted => render_repair_completed(repair, customer, store),
        NotificationKind::Custom { message } => render_custom(message, repair, customer, store),
    }
}

// =============================================================================
// Per-kind renderers
// =============================================================================

fn render_test(repair: &RepairTicket, customer: &Customer, store: &Store) -> RenderedMessage {
    let whatsapp_text = format!(
        "Hello {name}! This is a test message from {store} for repair {ticket}. \
         If you received this, notifications for your repair are working.",
        name = customer.name,
        store = store.name,
        ticket = repair.ticket_number,
    );

    let email_subject = format!("[{}] Test notification", store.name);

    let body = format!(
        r#"            <p style="margin: 0 0 16px 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Hello {name},
            </p>
            <p style="margin: 0; font-size: 14px; color: #374151; line-height: 1.5;">
                This is a test notification from {store} for repair
                <strong>{ticket}</strong>. If you received this, notifications
                for your repair are working.
            </p>"#,
        name = html_escape(&customer.name),
        store = html_escape(&store.name),
        ticket = html_escape(&repair.ticket_number),
    );

    RenderedMessage {
        whatsapp_text,
        email_subject,
        email_html: wrap_email(store, DEFAULT_ACCENT, "Test notification", &body),
    }
}

fn render_status_updated(
    repair: &RepairTicket,
    customer: &Customer,
    store: &Store,
) -> RenderedMessage {
    // Cancellation arrives through the same trigger but reads very
    // differently to a customer, so it gets its own wording.
    if repair.status == RepairStatus::Cancelled {
        return render_cancelled(repair, customer, store);
    }

    let status_display = repair.status.display_name();

    let whatsapp_text = format!(
        "Hello {name}, an update on your repair {ticket} ({device}).\n\
         Status: {status}\n\
         Diagnosis: {diagnosis}\n\
         Estimated completion: {eta}\n\n\
         {store} - {phone}",
        name = customer.name,
        ticket = repair.ticket_number,
        device = repair.device_label(),
        status = status_display,
        diagnosis = diagnosis_line(repair),
        eta = completion_line(repair),
        store = store.name,
        phone = store_phone(store),
    );

    let email_subject = format!(
        "[{}] Repair {} - {}",
        store.name, repair.ticket_number, status_display
    );

    let rows = [
        ("Ticket", html_escape(&repair.ticket_number)),
        ("Device", html_escape(&repair.device_label())),
        ("Status", status_display.to_string()),
        ("Diagnosis", html_escape(diagnosis_line(repair))),
        ("Estimated completion", html_escape(&completion_line(repair))),
    ];

    let body = format!(
        r#"            <p style="margin: 0 0 16px 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Hello {name}, your repair has a new update.
            </p>
{table}"#,
        name = html_escape(&customer.name),
        table = detail_table(&rows),
    );

    RenderedMessage {
        whatsapp_text,
        email_subject,
        email_html: wrap_email(
            store,
            status_color(repair.status),
            &format!("Repair update - {}", status_display),
            &body,
        ),
    }
}

fn render_cancelled(repair: &RepairTicket, customer: &Customer, store: &Store) -> RenderedMessage {
    let whatsapp_text = format!(
        "Hello {name}, your repair {ticket} ({device}) at {store} has been cancelled. \
         If this is unexpected, please contact us at {phone}.",
        name = customer.name,
        ticket = repair.ticket_number,
        device = repair.device_label(),
        store = store.name,
        phone = store_phone(store),
    );

    let email_subject = format!(
        "[{}] Repair {} - Cancelled",
        store.name, repair.ticket_number
    );

    let body = format!(
        r#"            <p style="margin: 0 0 16px 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Hello {name},
            </p>
            <p style="margin: 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Your repair <strong>{ticket}</strong> ({device}) has been
                cancelled. If this is unexpected, please contact us at {phone}.
            </p>"#,
        name = html_escape(&customer.name),
        ticket = html_escape(&repair.ticket_number),
        device = html_escape(&repair.device_label()),
        phone = html_escape(store_phone(store)),
    );

    RenderedMessage {
        whatsapp_text,
        email_subject,
        email_html: wrap_email(
            store,
            status_color(RepairStatus::Cancelled),
            "Repair cancelled",
            &body,
        ),
    }
}

fn render_repair_completed(
    repair: &RepairTicket,
    customer: &Customer,
    store: &Store,
) -> RenderedMessage {
    let total = total_line(repair, store);

    let whatsapp_text = format!(
        "Good news {name}! Your {device} is repaired and ready for pickup at {store}.\n\
         Ticket: {ticket}\n\
         Total: {total}\n\
         Address: {address}\n\n\
         See you soon!",
        name = customer.name,
        device = repair.device_label(),
        store = store.name,
        ticket = repair.ticket_number,
        total = total,
        address = store.address,
    );

    let email_subject = format!(
        "[{}] Repair {} is ready for pickup",
        store.name, repair.ticket_number
    );

    let rows = [
        ("Ticket", html_escape(&repair.ticket_number)),
        ("Device", html_escape(&repair.device_label())),
        ("Total", html_escape(&total)),
        ("Pickup address", html_escape(&store.address)),
    ];

    let body = format!(
        r#"            <p style="margin: 0 0 16px 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Good news {name}! Your device is repaired and ready for pickup.
            </p>
{table}"#,
        name = html_escape(&customer.name),
        table = detail_table(&rows),
    );

    RenderedMessage {
        whatsapp_text,
        email_subject,
        email_html: wrap_email(
            store,
            status_color(RepairStatus::Completed),
            "Your device is ready",
            &body,
        ),
    }
}

fn render_custom(
    message: &str,
    repair: &RepairTicket,
    customer: &Customer,
    store: &Store,
) -> RenderedMessage {
    let whatsapp_text = format!(
        "Hello {name}, a message from {store} about your repair {ticket}:\n\n\
         {message}\n\n\
         {store} - {phone}",
        name = customer.name,
        store = store.name,
        ticket = repair.ticket_number,
        message = message,
        phone = store_phone(store),
    );

    let email_subject = format!(
        "[{}] A message about repair {}",
        store.name, repair.ticket_number
    );

    let body = format!(
        r#"            <p style="margin: 0 0 16px 0; font-size: 14px; color: #374151; line-height: 1.5;">
                Hello {name}, a message from {store} about your repair
                <strong>{ticket}</strong>:
            </p>
            <p style="margin: 0; padding: 12px 16px; background-color: #f9fafb; border-left: 3px solid #2563eb; font-size: 14px; color: #374151; line-height: 1.5; white-space: pre-wrap;">{message}</p>"#,
        name = html_escape(&customer.name),
        store = html_escape(&store.name),
        ticket = html_escape(&repair.ticket_number),
        message = html_escape(message),
    );

    RenderedMessage {
        whatsapp_text,
        email_subject,
        email_html: wrap_email(store, DEFAULT_ACCENT, "Message about your repair", &body),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn store_phone(store: &Store) -> &str {
    store.phone.as_deref().unwrap_or(NOT_SPECIFIED)
}

fn diagnosis_line(repair: &RepairTicket) -> &str {
    match repair.diagnosis.as_deref() {
        Some(d) if !d.trim().is_empty() => d,
        _ => PENDING_DIAGNOSIS,
    }
}

fn completion_line(repair: &RepairTicket) -> String {
    match repair.estimated_completion {
        Some(ts) => ts.format("%Y-%m-%d").to_string(),
        None => TO_BE_CONFIRMED.to_string(),
    }
}

fn total_line(repair: &RepairTicket, store: &Store) -> String {
    match repair.customer_total() {
        Some(amount) => format_money(amount, &store.currency),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// Formats a monetary amount in the store's currency
fn format_money(amount: Decimal, currency: &str) -> String {
    let amount = amount.round_dp(2);
    match currency {
        "EUR" => format!("{} €", amount),
        "USD" => format!("${}", amount),
        "GBP" => format!("£{}", amount),
        other => format!("{} {}", amount, other),
    }
}

/// Accent color for the email header, keyed on status
fn status_color(status: RepairStatus) -> &'static str {
    match status {
        RepairStatus::Received => "#3b82f6",
        RepairStatus::Diagnosed => "#8b5cf6",
        RepairStatus::InRepair => "#f59e0b",
        RepairStatus::Completed => "#10b981",
        RepairStatus::Delivered => "#10b981",
        RepairStatus::Cancelled => "#dc2626",
    }
}

/// Shared email shell. `heading` and `body` must already be escaped;
/// store fields are escaped here.
fn wrap_email(store: &Store, accent: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f3f4f6;">
    <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 1px 3px rgba(0,0,0,0.1);">
        <div style="background-color: {accent}; padding: 16px 24px;">
            <h1 style="color: #ffffff; margin: 0; font-size: 18px; font-weight: 600;">
                {heading}
            </h1>
        </div>
        <div style="padding: 24px;">
{body}
        </div>
        <div style="padding: 16px 24px; background-color: #f9fafb; border-top: 1px solid #e5e7eb;">
            <p style="margin: 0; font-size: 12px; color: #6b7280;">
                {store_name} | {store_address}{store_phone}
            </p>
        </div>
    </div>
</body>
</html>"#,
        accent = accent,
        heading = heading,
        body = body,
        store_name = html_escape(&store.name),
        store_address = html_escape(&store.address),
        store_phone = store
            .phone
            .as_deref()
            .map(|p| format!(" | {}", html_escape(p)))
            .unwrap_or_default(),
    )
}

/// One label/value row in the detail table. `value` must already be escaped.
fn detail_row(label: &str, value: &str) -> String {
    format!(
        r#"                <tr>
                    <td style="padding: 8px 0; color: #6b7280; border-top: 1px solid #e5e7eb;">{}</td>
                    <td style="padding: 8px 0; color: #111827; border-top: 1px solid #e5e7eb; text-align: right;">{}</td>
                </tr>"#,
        label, value
    )
}

fn detail_table(rows: &[(&str, String)]) -> String {
    let rows_html = rows
        .iter()
        .map(|(label, value)| detail_row(label, value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"            <table style="width: 100%; border-collapse: collapse; font-size: 13px;">
{}
            </table>"#,
        rows_html
    )
}

/// Simple HTML escaping for email content
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
