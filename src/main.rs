mod error;
mod link;
mod peer;
mod sink;
mod transport;

use anyhow::{anyhow, Result};
use error::LinkError;
use link::{LinkConfig, LinkManager};
use peer::{resolve_peer, Peer, StaticPeers};
use sink::{LogListener, LogSink};
use std::sync::Arc;
use transport::{BondedPeers, RfcommConnector, RfcommTarget, TcpConnector, TransportConnector};

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = LinkConfig::default();
    info!("HUD link starting");
    info!(
        "  Reconnect delay: {:?} (max {:?})",
        config.reconnect_delay, config.max_reconnect_delay
    );

    let result = match std::env::var("HUD_LINK_SIM_ADDR") {
        Ok(address) => run_simulated(address, config).await,
        Err(_) => run_bluetooth(config).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<LinkError>() {
            Some(LinkError::NoPeerAvailable) => error!("No devices paired, quitting"),
            _ => error!("HUD link failed: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Connect to the paired phone over Bluetooth RFCOMM
async fn run_bluetooth(config: LinkConfig) -> Result<()> {
    let peer = resolve_peer(&BondedPeers::new()).await?;

    // A fixed channel skips the service record lookup
    let target = match std::env::var("HUD_LINK_RFCOMM_CHANNEL") {
        Ok(value) => RfcommTarget::Channel(
            value
                .parse::<u8>()
                .map_err(|e| anyhow!("Invalid HUD_LINK_RFCOMM_CHANNEL '{}': {}", value, e))?,
        ),
        Err(_) => RfcommTarget::default(),
    };

    run_link(RfcommConnector::for_peer(&peer, target)?, config).await
}

/// Connect to a phone-sim instance over TCP
async fn run_simulated(address: String, config: LinkConfig) -> Result<()> {
    let peer = resolve_peer(&StaticPeers(vec![Peer::new("phone-sim", address)])).await?;
    run_link(TcpConnector::new(peer.address), config).await
}

/// Run the link until Ctrl-C
async fn run_link<C: TransportConnector>(connector: C, config: LinkConfig) -> Result<()> {
    let mut manager = LinkManager::new(connector, Arc::new(LogSink), config);
    manager.set_listener(Arc::new(LogListener));
    manager.start().await?;

    tokio::signal::ctrl_c().await?;
    info!(
        "Interrupted, shutting down (phone connected: {})",
        manager.is_connected()
    );

    manager.stop().await;
    Ok(())
}
