use hud_link_shared::HudMessage;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let addr = std::env::var("HUD_SIM_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());
    let listener = TcpListener::bind(&addr).await?;
    info!("[SIM] Phone simulator listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("[SIM] HUD connected from {}", peer);
        tokio::spawn(async move {
            if let Err(e) = stream_sensors(socket).await {
                warn!("[SIM] HUD {} dropped: {}", peer, e);
            }
        });
    }
}

/// Send the display filter once, then one reading per second
async fn stream_sensors(mut socket: TcpStream) -> anyhow::Result<()> {
    let filter = HudMessage::FilterCommand {
        names: vec!["heart_rate".into(), "speed".into(), "battery".into()],
    };
    send(&mut socket, &filter).await?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut tick: u64 = 0;
    loop {
        ticker.tick().await;
        tick += 1;

        let readings = [
            ("heart_rate", format!("{}", 60 + tick % 40), "bpm"),
            ("speed", format!("{:.1}", (tick % 50) as f64 * 0.7), "km/h"),
            ("battery", format!("{}", 100 - tick.min(100)), "%"),
        ];
        for (name, value, unit) in readings {
            let reading = HudMessage::SensorReading {
                name: name.into(),
                value1: value,
                value2: unit.into(),
            };
            send(&mut socket, &reading).await?;
        }
    }
}

async fn send(socket: &mut TcpStream, message: &HudMessage) -> anyhow::Result<()> {
    socket.write_all(format!("{}\n", message).as_bytes()).await?;
    Ok(())
}
