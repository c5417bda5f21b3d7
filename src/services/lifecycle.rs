//! Repair status state machine.
//!
//! Encodes which ticket transitions are legal and which of them trigger a
//! customer notification. Forward movement follows the linear order
//! received -> diagnosed -> in_repair -> completed -> delivered one step at
//! a time; cancellation is reachable from any non-terminal state.

use crate::error::AppError;
use crate::models::{NotificationKind, RepairStatus};

/// Rejected status change; the ticket keeps its current status
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RepairStatus,
    pub to: RepairStatus,
}

impl From<InvalidTransition> for AppError {
    fn from(e: InvalidTransition) -> Self {
        AppError::InvalidTransition {
            from: e.from,
            to: e.to,
        }
    }
}

/// A validated status change together with its notification trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: RepairStatus,
    pub to: RepairStatus,
    pub trigger: Option<NotificationKind>,
}

/// The next state in the linear forward order, if any
fn forward_step(status: RepairStatus) -> Option<RepairStatus> {
    match status {
        RepairStatus::Received => Some(RepairStatus::Diagnosed),
        RepairStatus::Diagnosed => Some(RepairStatus::InRepair),
        RepairStatus::InRepair => Some(RepairStatus::Completed),
        RepairStatus::Completed => Some(RepairStatus::Delivered),
        RepairStatus::Delivered | RepairStatus::Cancelled => None,
    }
}

/// Notification triggered by arriving at `status`, if any.
///
/// Delivery is the customer collecting the device in person, so it sends
/// nothing. Cancellation goes through the status-update template, which
/// renders dedicated wording for it.
fn trigger_for(status: RepairStatus) -> Option<NotificationKind> {
    match status {
        RepairStatus::Diagnosed | RepairStatus::InRepair | RepairStatus::Cancelled => {
            Some(NotificationKind::StatusUpdated)
        }
        RepairStatus::Completed => Some(NotificationKind::RepairCompleted),
        RepairStatus::Received | RepairStatus::Delivered => None,
    }
}

/// Validates a requested status change.
///
/// Terminal tickets reject every request, skipping forward steps is
/// rejected, and `cancelled` is accepted from any non-terminal state.
/// Requesting the current status again is a rejection, not a no-op.
pub fn transition(
    current: RepairStatus,
    requested: RepairStatus,
) -> Result<StatusChange, InvalidTransition> {
    let rejected = InvalidTransition {
        from: current,
        to: requested,
    };

    if current.is_terminal() {
        return Err(rejected);
    }

    if requested == RepairStatus::Cancelled {
        return Ok(StatusChange {
            from: current,
            to: requested,
            trigger: trigger_for(requested),
        });
    }

    match forward_step(current) {
        Some(next) if next == requested => Ok(StatusChange {
            from: current,
            to: requested,
            trigger: trigger_for(requested),
        }),
        _ => Err(rejected),
    }
}
