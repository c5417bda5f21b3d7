pub mod customer;
pub mod notification;
pub mod repair;
pub mod store;

pub use customer::{Customer, CustomerType};
pub use notification::{ChannelKind, NotificationKind, NotificationRecord};
pub use repair::{
    ContactPreferences, Priority, RepairStatus, RepairSummary, RepairTicket, StoreContact,
    UpdateRepairStatus,
};
pub use store::Store;
