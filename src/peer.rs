//! Peer identity and the one-shot lookup that picks it

use crate::error::LinkError;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use tracing::info;

/// The remote device the link connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Human-readable device name (may be empty)
    pub name: String,
    /// Transport address (Bluetooth MAC or `host:port`)
    pub address: String,
}

impl Peer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.address)
    }
}

/// Source of candidate peers
#[async_trait]
pub trait PeerResolver: Send + Sync {
    /// List paired peers in enumeration order
    async fn paired_peers(&self) -> Result<Vec<Peer>>;
}

/// Fixed peer list
#[derive(Debug, Clone, Default)]
pub struct StaticPeers(pub Vec<Peer>);

#[async_trait]
impl PeerResolver for StaticPeers {
    async fn paired_peers(&self) -> Result<Vec<Peer>> {
        Ok(self.0.clone())
    }
}

/// Pick the peer to connect to
///
/// Only one paired phone is expected; with several, the first enumerated wins.
pub async fn resolve_peer(resolver: &dyn PeerResolver) -> Result<Peer, LinkError> {
    let peers = resolver
        .paired_peers()
        .await
        .map_err(LinkError::Resolution)?;

    if peers.len() > 1 {
        info!(
            "[LINK] {} paired devices found, using the first one",
            peers.len()
        );
    }

    let peer = peers.into_iter().next().ok_or(LinkError::NoPeerAvailable)?;
    info!("[LINK] Using connection to {}", peer);
    Ok(peer)
}
