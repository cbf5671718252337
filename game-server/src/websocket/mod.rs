use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use game_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use rate_limiter::RateLimiter;

/// Drives one client socket: binds it to a user on `authenticate`, keeps it
/// alive on `heartbeat`, and forwards queued server events until either side
/// drops. All game actions arrive over HTTP; the socket is push-only.
pub async fn handle_connection(websocket: WebSocket, connection_manager: Arc<ConnectionManager>) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let mut rate_limiter = RateLimiter::new();

    let message_receiver = connection_manager.create_connection(connection_id).await;

    let incoming_handler = {
        let connection_manager = connection_manager.clone();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if let Err(e) = handle_message(
                            msg,
                            &mut rate_limiter,
                            &connection_manager,
                            connection_id,
                        )
                        .await
                        {
                            error!("Error handling message for {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing_handler = {
        async move {
            let mut receiver = message_receiver;

            while let Some(message) = receiver.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize message: {:?}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sender.send(Message::text(json)).await {
                    warn!("Failed to send message to {}: {:?}", connection_id, e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    info!("Connection {} disconnected", connection_id);
    connection_manager.remove_connection(connection_id).await;
}

async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    connection_manager: &Arc<ConnectionManager>,
    connection_id: ConnectionId,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !rate_limiter.allow() {
        warn!("Rate limit exceeded for connection {}", connection_id);
        return Err("Rate limit exceeded".into());
    }

    if !msg.is_text() {
        return Ok(());
    }

    let text = msg.to_str().map_err(|_| "Invalid text message")?;

    let client_message: ClientMessage =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON message: {}", e))?;

    match client_message {
        ClientMessage::Authenticate { user_id } => {
            connection_manager.register(connection_id, user_id).await?;
            info!("Connection {} bound to user {}", connection_id, user_id);
            connection_manager
                .send_to_connection(
                    connection_id,
                    ServerMessage::AuthenticationSuccess { user_id },
                )
                .await?;
        }
        ClientMessage::Heartbeat => {
            connection_manager.update_activity(connection_id).await;
        }
    }

    Ok(())
}
