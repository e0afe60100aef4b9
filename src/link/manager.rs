//! Link manager with a persistent phone connection and automatic reconnection

use crate::error::LinkError;
use crate::link::Backoff;
use crate::sink::{dispatch, LinkListener, SensorSink};
use crate::transport::{TransportConnector, TransportStream};
use hud_link_shared::{decode_line, defaults, LineDecoder};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Connectivity of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    /// Not running
    Disconnected = 0,
    /// Attempting to connect, or waiting to retry
    Connecting = 1,
    /// A stream to the phone is open
    Connected = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LinkState::Connecting,
            2 => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }
}

/// Configuration for the link manager
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Reconnection delay (initial)
    pub reconnect_delay: Duration,
    /// Maximum reconnection delay
    pub max_reconnect_delay: Duration,
    /// Bytes requested per stream read
    pub read_buffer_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(defaults::RECONNECT_DELAY_MS),
            max_reconnect_delay: Duration::from_millis(defaults::MAX_RECONNECT_DELAY_MS),
            read_buffer_size: defaults::READ_BUFFER_SIZE,
        }
    }
}

/// Handle to a running connection loop
struct Running {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Keeps a connection to the phone alive and feeds its lines to the sink
pub struct LinkManager<C: TransportConnector> {
    config: LinkConfig,
    connector: Arc<C>,
    sink: Arc<dyn SensorSink>,
    listener: Option<Arc<dyn LinkListener>>,
    state: Arc<AtomicU8>,
    running: Mutex<Option<Running>>,
}

impl<C: TransportConnector> LinkManager<C> {
    /// Create a link manager; nothing connects until [`LinkManager::start`]
    pub fn new(connector: C, sink: Arc<dyn SensorSink>, config: LinkConfig) -> Self {
        Self {
            config,
            connector: Arc::new(connector),
            sink,
            listener: None,
            state: Arc::new(AtomicU8::new(LinkState::Disconnected as u8)),
            running: Mutex::new(None),
        }
    }

    /// Register the connection state listener
    ///
    /// Takes effect on the next [`LinkManager::start`].
    pub fn set_listener(&mut self, listener: Arc<dyn LinkListener>) {
        self.listener = Some(listener);
    }

    #[cfg(test)]
    fn connector(&self) -> &C {
        &self.connector
    }

    /// Last known link state
    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if a stream to the phone is currently open
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Spawn the connection loop
    pub async fn start(&self) -> Result<(), LinkError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(LinkError::AlreadyRunning);
        }

        info!("[LINK] Starting {} link", self.connector.name());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = LinkContext {
            config: self.config.clone(),
            connector: self.connector.clone(),
            sink: self.sink.clone(),
            listener: self.listener.clone(),
            state: self.state.clone(),
        };
        let task = tokio::spawn(async move {
            link_loop(ctx, shutdown_rx).await;
        });

        *running = Some(Running { shutdown_tx, task });
        Ok(())
    }

    /// Close the connection and stop the loop; no-op when not running
    ///
    /// The running slot stays locked until the loop has exited, so a
    /// concurrent `start()` cannot overlap with the old loop's teardown.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(current) = running.take() else {
            return;
        };

        info!("[LINK] Shutting down {} link", self.connector.name());
        let _ = current.shutdown_tx.send(true);

        if let Err(e) = current.task.await {
            warn!("[LINK] Link task ended abnormally: {}", e);
        }
    }
}

/// State the connection loop works with
struct LinkContext<C> {
    config: LinkConfig,
    connector: Arc<C>,
    sink: Arc<dyn SensorSink>,
    listener: Option<Arc<dyn LinkListener>>,
    state: Arc<AtomicU8>,
}

impl<C> LinkContext<C> {
    fn set_state(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Record a transition into or out of `Connected` and tell the listener
    fn set_connected(&self, connected: bool) {
        self.set_state(if connected {
            LinkState::Connected
        } else {
            LinkState::Connecting
        });
        if let Some(listener) = &self.listener {
            listener.on_connection_state_changed(connected);
        }
    }

    fn handle_line(&self, line: &str) {
        match decode_line(line) {
            Ok(message) => dispatch(self.sink.as_ref(), &message),
            Err(e) => warn!("[LINK] {}", e),
        }
    }
}

/// How a connected session ended
enum ReadOutcome {
    /// Peer closed the stream
    Closed,
    /// Read or framing error
    Failed(String),
    /// Shutdown was requested
    Stopped,
}

fn stop_requested(shutdown_rx: &watch::Receiver<bool>) -> bool {
    *shutdown_rx.borrow() || shutdown_rx.has_changed().is_err()
}

/// Main connection loop with reconnection logic
async fn link_loop<C: TransportConnector>(
    ctx: LinkContext<C>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut backoff = Backoff::new(ctx.config.reconnect_delay, ctx.config.max_reconnect_delay);

    loop {
        ctx.set_state(LinkState::Connecting);
        debug!("[LINK] Attempting {} connection...", ctx.connector.name());

        let attempt = tokio::select! {
            _ = shutdown_rx.changed() => break,
            result = ctx.connector.connect() => result,
        };

        match attempt {
            Ok(stream) => {
                info!("[LINK] Connected via {}", ctx.connector.name());
                ctx.set_connected(true);
                backoff.reset();

                let outcome = read_lines(stream, &ctx, &mut shutdown_rx).await;
                match &outcome {
                    ReadOutcome::Closed => info!("[LINK] Peer closed connection"),
                    ReadOutcome::Failed(reason) => warn!("[LINK] Connection lost: {}", reason),
                    ReadOutcome::Stopped => debug!("[LINK] Closing connection for shutdown"),
                }
                ctx.set_connected(false);

                if matches!(outcome, ReadOutcome::Stopped) || stop_requested(&shutdown_rx) {
                    break;
                }
                // A session that came up reconnects right away at the initial delay
            }
            Err(e) => {
                warn!("[LINK] Connection attempt failed: {}", e);

                let delay = backoff.next_delay();
                info!(
                    "[LINK] Will attempt a reconnect in {} seconds",
                    delay.as_secs()
                );
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    ctx.set_state(LinkState::Disconnected);
    info!("[LINK] Link loop stopped");
}

/// Read lines until the stream ends, dispatching each before the next read
async fn read_lines<C, S: TransportStream>(
    mut stream: S,
    ctx: &LinkContext<C>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> ReadOutcome {
    let mut decoder = LineDecoder::new();
    let mut read_buf = vec![0u8; ctx.config.read_buffer_size.max(1)];

    let outcome = 'read: loop {
        let result = tokio::select! {
            _ = shutdown_rx.changed() => break 'read ReadOutcome::Stopped,
            result = stream.read(&mut read_buf) => result,
        };

        match result {
            Ok(0) => {
                if let Some(line) = decoder.finish() {
                    ctx.handle_line(&line);
                }
                break 'read ReadOutcome::Closed;
            }
            Ok(n) => {
                decoder.extend(&read_buf[..n]);
                loop {
                    match decoder.next_line() {
                        Ok(Some(line)) => ctx.handle_line(&line),
                        Ok(None) => break,
                        Err(e) => break 'read ReadOutcome::Failed(e.to_string()),
                    }
                }
            }
            Err(e) => break 'read ReadOutcome::Failed(format!("Read error: {}", e)),
        }
    };

    if let Err(e) = stream.shutdown().await {
        debug!("[LINK] Ignoring close error: {}", e);
    }

    outcome
}
