mod listener;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use listener::{CliListener, SessionEnd};
use roomlink::client::{ReqwestRoomClient, RtcEngine, SessionConfig, SessionHandle, WsConnector};
use roomlink::ConnectionParameters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "roomlink", version)]
#[command(about = "Join a signaling room and negotiate a peer session")]
struct Cli {
    /// Room server base URL.
    #[arg(long, env = "ROOMLINK_SERVER", default_value = "https://appr.tc")]
    server: Url,

    #[arg(long, env = "ROOMLINK_ROOM")]
    room: String,

    /// Answer your own offer instead of waiting for a peer.
    #[arg(long, env = "ROOMLINK_LOOPBACK")]
    loopback: bool,

    /// Extra query string appended to the join request.
    #[arg(long, env = "ROOMLINK_URL_PARAMS")]
    url_params: Option<String>,

    /// Seconds to stay in the call before leaving.
    #[arg(long, env = "ROOMLINK_DURATION", default_value_t = 30)]
    duration: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut connection = ConnectionParameters::new(cli.server.as_str(), cli.room.as_str())
        .with_loopback(cli.loopback);
    if let Some(params) = cli.url_params {
        connection = connection.with_url_parameters(params);
    }

    let config = SessionConfig {
        referer: cli.server.origin().ascii_serialization(),
        ..SessionConfig::default()
    };
    let (end_tx, mut end_rx) = mpsc::unbounded_channel();

    let session = SessionHandle::spawn(
        config.clone(),
        Arc::new(ReqwestRoomClient::new(config.referer.clone())),
        Arc::new(WsConnector::new(config.referer.clone())),
        Arc::new(RtcEngine::new()),
        Arc::new(CliListener::new(end_tx)),
    );

    println!(
        "{} {} {}",
        "📡 Joining room".green().bold(),
        cli.room.bold(),
        format!("at {}", cli.server).dimmed()
    );
    info!(room = %cli.room, server = %cli.server, loopback = cli.loopback, "Joining room");
    session
        .join_room(connection)
        .await
        .context("Failed to start joining the room")?;

    let ended = tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(cli.duration)) => {
            info!("Call duration of {}s elapsed", cli.duration);
            None
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            None
        }
        end = end_rx.recv() => end,
    };
    match &ended {
        Some(SessionEnd::Failed(reason)) => error!("Session failed: {}", reason),
        Some(SessionEnd::RoomLeft) => info!("Remote side left the room"),
        None => {}
    }

    if let Ok(snapshot) = session.snapshot().await {
        println!(
            "{} room {:?}, socket {:?}, negotiated: {}",
            "ℹ".cyan(),
            snapshot.room_state,
            snapshot.socket_state,
            snapshot.local_description_set && snapshot.remote_description_set
        );
    }

    println!("{}", "👋 Leaving room...".cyan());
    session
        .leave_room()
        .await
        .context("Failed to leave the room cleanly")?;
    info!("Left room {}", cli.room);

    if let Some(SessionEnd::Failed(reason)) = ended {
        anyhow::bail!("Session failed: {}", reason);
    }
    println!("{}", "✨ Done".green().bold());
    Ok(())
}
