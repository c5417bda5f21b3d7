//! Common test utilities and helpers
//!
//! This module provides shared functionality for all tests.
#![allow(dead_code)]

pub mod fixtures;
pub mod store;

pub use fixtures::{
    sample_customer, sample_store, wait_until, RecordingChannel, RecordingMailer, TicketBuilder,
};
pub use store::MemoryStore;
