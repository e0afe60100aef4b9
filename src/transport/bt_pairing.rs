//! Lookup of Bluetooth devices already paired with this adapter

use crate::peer::{Peer, PeerResolver};
use anyhow::Result;
use async_trait::async_trait;
use bluer::Adapter;
use tracing::debug;

/// Resolves peers from the bonded devices of the default BlueZ adapter
#[derive(Debug, Default)]
pub struct BondedPeers;

impl BondedPeers {
    pub fn new() -> Self {
        Self
    }

    /// Get the default Bluetooth adapter
    pub async fn get_adapter() -> Result<Adapter> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        adapter.set_powered(true).await?;
        Ok(adapter)
    }
}

#[async_trait]
impl PeerResolver for BondedPeers {
    async fn paired_peers(&self) -> Result<Vec<Peer>> {
        let adapter = Self::get_adapter().await?;
        let mut peers = Vec::new();

        for addr in adapter.device_addresses().await? {
            let device = adapter.device(addr)?;
            if !device.is_paired().await? {
                continue;
            }
            let name = device.name().await?.unwrap_or_default();
            debug!("[BT] Paired device {} {{{}}}", name, addr);
            peers.push(Peer::new(name, addr.to_string()));
        }

        Ok(peers)
    }
}
