//! RFCOMM transport implementation for the Bluetooth phone link

use crate::peer::Peer;
use crate::transport::traits::{TransportConnector, TransportStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bluer::rfcomm::{
    Profile, ProfileHandle, Role, SocketAddr as RfcommAddr, Stream as RfcommStream,
};
use bluer::{Address, Session, Uuid};
use futures::StreamExt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, info};

/// Service record the phone app listens under
pub const HUD_SERVICE_UUID: Uuid = Uuid::from_u128(0xfa8730d5_afac_11df_8739_0310210c9366);

/// How to reach the phone's RFCOMM server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfcommTarget {
    /// Look the channel up through the SDP service record
    Service(Uuid),
    /// Dial a fixed channel
    Channel(u8),
}

impl Default for RfcommTarget {
    fn default() -> Self {
        RfcommTarget::Service(HUD_SERVICE_UUID)
    }
}

/// Client profile registration backing a service-addressed stream
struct ProfileRegistration {
    _session: Session,
    _handle: ProfileHandle,
}

/// RFCOMM stream wrapper implementing TransportStream
pub struct RfcommTransportStream {
    inner: RfcommStream,
    peer_addr: Address,
    /// Kept registered for the lifetime of the session
    _profile: Option<Box<ProfileRegistration>>,
}

impl RfcommTransportStream {
    /// Create a new RFCOMM transport stream
    pub fn new(stream: RfcommStream, peer_addr: Address) -> Self {
        Self {
            inner: stream,
            peer_addr,
            _profile: None,
        }
    }
}

impl AsyncRead for RfcommTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

#[async_trait]
impl TransportStream for RfcommTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        debug!("[BT] Closing link to {}", self.peer_addr);
        tokio::io::AsyncWriteExt::shutdown(&mut self.inner).await?;
        Ok(())
    }
}

/// RFCOMM connector for the paired phone
pub struct RfcommConnector {
    address: Address,
    target: RfcommTarget,
}

impl RfcommConnector {
    /// Create connector with a known Bluetooth address
    pub fn with_address(address: Address, target: RfcommTarget) -> Self {
        Self { address, target }
    }

    /// Create connector for a resolved peer
    pub fn for_peer(peer: &Peer, target: RfcommTarget) -> Result<Self> {
        let address: Address = peer
            .address
            .parse()
            .map_err(|e| anyhow!("Invalid Bluetooth address '{}': {}", peer.address, e))?;
        Ok(Self::with_address(address, target))
    }

    async fn connect_channel(&self, channel: u8) -> Result<RfcommTransportStream> {
        let socket_addr = RfcommAddr::new(self.address, channel);
        info!("[BT] Connecting to {} channel {}", self.address, channel);

        let stream = RfcommStream::connect(socket_addr)
            .await
            .map_err(|e| anyhow!("RFCOMM connect failed: {}", e))?;

        Ok(RfcommTransportStream::new(stream, self.address))
    }

    /// Connect through a client profile so BlueZ resolves the channel via SDP
    async fn connect_service(&self, uuid: Uuid) -> Result<RfcommTransportStream> {
        let session = Session::new().await?;
        let adapter = session.default_adapter().await?;
        let device = adapter.device(self.address)?;

        let profile = Profile {
            uuid,
            role: Some(Role::Client),
            ..Default::default()
        };
        let mut handle = session.register_profile(profile).await?;
        info!("[BT] Connecting to {} service {}", self.address, uuid);

        let connect = device.connect_profile(&uuid);
        tokio::pin!(connect);
        let mut connect_done = false;

        let stream = loop {
            tokio::select! {
                result = &mut connect, if !connect_done => {
                    result.map_err(|e| anyhow!("RFCOMM profile connect failed: {}", e))?;
                    connect_done = true;
                }
                request = handle.next() => {
                    let request = request.ok_or_else(|| anyhow!("RFCOMM profile unregistered"))?;
                    if request.device() != self.address {
                        debug!("[BT] Ignoring profile connection from {}", request.device());
                        continue;
                    }
                    break request.accept()?;
                }
            }
        };

        let mut transport = RfcommTransportStream::new(stream, self.address);
        transport._profile = Some(Box::new(ProfileRegistration {
            _session: session,
            _handle: handle,
        }));
        Ok(transport)
    }
}

#[async_trait]
impl TransportConnector for RfcommConnector {
    type Stream = RfcommTransportStream;

    async fn connect(&self) -> Result<Self::Stream> {
        let stream = match self.target {
            RfcommTarget::Service(uuid) => self.connect_service(uuid).await?,
            RfcommTarget::Channel(channel) => self.connect_channel(channel).await?,
        };

        info!("[BT] Connected to {}", self.address);
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "Bluetooth"
    }
}
