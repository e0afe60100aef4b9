//! Link management for the persistent phone connection
//!
//! This module handles:
//! - A single stream connection to the paired phone
//! - Automatic reconnection with exponential backoff
//! - Line decoding and in-order delivery to the sensor sink
//! - Connect/disconnect notifications

mod backoff;
mod manager;

pub use backoff::Backoff;
pub use manager::{LinkConfig, LinkManager};
