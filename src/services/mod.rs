pub mod lifecycle;
pub mod notification;
pub mod repair;
pub mod tracking;

pub use lifecycle::{transition, InvalidTransition, StatusChange};
pub use notification::{
    ChannelError, ChannelOutcome, MailChannel, MessageChannel, NotificationResult, Notifier,
    ProviderReceipt, SmtpMailer, WhatsAppClient,
};
pub use repair::{ContactQuery, RepairService, RepairStore};
pub use tracking::{TrackingService, TrackingToken};
