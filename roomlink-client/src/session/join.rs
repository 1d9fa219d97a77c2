use crate::error::SessionError;
use crate::transport::{HttpRequest, RoomHttpClient};
use roomlink_core::codec::{decode_ice_servers, decode_join_response};
use roomlink_core::{ConnectionParameters, IceServerConfig, SignalingParameters};
use std::time::Duration;
use tracing::{info, warn};

/// Joins the room and completes the ICE server list.
pub(crate) async fn join_room(
    client: &dyn RoomHttpClient,
    connection: &ConnectionParameters,
    relay_timeout: Duration,
) -> Result<SignalingParameters, SessionError> {
    let url = connection.join_url();
    info!("C->ROOM: POST {}", url);

    let response = client.request(HttpRequest::post(url, None)).await?;
    info!("ROOM->C: {}", response);

    let mut params = decode_join_response(&response)?;
    if !params.has_turn_server() && !params.ice_server_url.is_empty() {
        let relay_servers = fetch_relay_servers(client, &params.ice_server_url, relay_timeout).await;
        params.ice_servers.extend(relay_servers);
    }
    Ok(params)
}

/// Never fails: a slow or broken relay service just leaves the list empty.
async fn fetch_relay_servers(
    client: &dyn RoomHttpClient,
    url: &str,
    timeout: Duration,
) -> Vec<IceServerConfig> {
    info!("C->ROOM: POST {}", url);
    let request = HttpRequest::post(url, None).with_timeout(timeout);

    let response = match tokio::time::timeout(timeout, client.request(request)).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            warn!("Relay server request failed: {}", e);
            return Vec::new();
        }
        Err(_) => {
            warn!("Relay server request to {} timed out", url);
            return Vec::new();
        }
    };

    match decode_ice_servers(&response) {
        Ok(servers) => {
            info!("Received {} relay servers", servers.len());
            servers
        }
        Err(e) => {
            warn!("Ignoring relay server response: {}", e);
            Vec::new()
        }
    }
}
