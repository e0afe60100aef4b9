//! Error types for the link manager

use thiserror::Error;

/// Errors surfaced by peer resolution and link lifecycle calls
#[derive(Error, Debug)]
pub enum LinkError {
    /// No paired device to connect to
    #[error("No paired peer available")]
    NoPeerAvailable,

    /// The peer lookup itself failed
    #[error("Peer resolution failed: {0}")]
    Resolution(#[source] anyhow::Error),

    /// `start()` called while the connection loop is running
    #[error("Link manager already running")]
    AlreadyRunning,
}
