use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use nerdle_core::{NerdleSession, NerdleStore, SessionSettings};
use nerdle_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;


use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

/// Placeholder wake-up for the deadline branch while nothing is pending.
const IDLE_WAKE: Duration = Duration::from_secs(3600);

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    store: Arc<dyn NerdleStore>,
    settings: SessionSettings,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let mut rate_limiter = RateLimiter::new();

    let (session, mut feeds) = match NerdleSession::open(store, settings).await {
        Ok(opened) => opened,
        Err(e) => {
            error!("Failed to open session for {}: {}", connection_id, e);
            let message = ServerMessage::Error {
                message: "League data is unavailable. Please try again later.".to_string(),
            };
            if let Ok(json) = serde_json::to_string(&message) {
                let _ = ws_sender.send(Message::text(json)).await;
            }
            let _ = ws_sender.close().await;
            return;
        }
    };

    let mut outgoing = connection_manager.create_connection(connection_id).await;
    let mut message_handler =
        MessageHandler::new(connection_id, connection_manager.clone(), session);

    // Loading view until the first players snapshot lands
    if let Err(e) = message_handler.push_view().await {
        warn!("Could not queue initial view for {}: {}", connection_id, e);
    }

    loop {
        let deadline = message_handler.next_deadline();

        tokio::select! {
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(msg)) => {
                        if let Err(e) =
                            handle_message(msg, &mut rate_limiter, &mut message_handler, connection_id)
                                .await
                        {
                            error!("Error handling message for {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                    None => break,
                }
            }
            queued = outgoing.recv() => {
                let Some(message) = queued else {
                    info!("Connection {} closed by server", connection_id);
                    break;
                };

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
            Some(snapshot) = feeds.next(), if feeds.is_live() => {
                if let Err(e) = message_handler.apply_snapshot(snapshot).await {
                    warn!("Dropping snapshot for {}: {}", connection_id, e);
                    break;
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(|| Instant::now() + IDLE_WAKE)), if deadline.is_some() => {
                if let Err(e) = message_handler.expire_transients(Instant::now()).await {
                    warn!("Dropping expiry update for {}: {}", connection_id, e);
                    break;
                }
            }
        }
    }

    info!("Connection {} disconnected", connection_id);
    feeds.release();
    connection_manager.remove_connection(connection_id).await;
}

async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &mut MessageHandler,
    connection_id: ConnectionId,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !rate_limiter.check_rate_limit() {
        warn!("Rate limit exceeded for connection {}", connection_id);
        return Err("Rate limit exceeded".into());
    }

    // Only handle text messages
    if !msg.is_text() {
        return Ok(());
    }

    let text = msg.to_str().map_err(|_| "Invalid text message")?;

    let client_message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Unparseable message from {}: {}", connection_id, e);
            message_handler
                .push_error(format!("Invalid JSON message: {}", e))
                .await?;
            return Ok(());
        }
    };

    message_handler.handle_message(client_message).await?;

    Ok(())
}
