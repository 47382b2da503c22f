//! WebSocket notification endpoint.
//!
//! A client connects to `/ws` and sends an auth frame as its first message:
//! `{"type":"auth","token":"<jwt>"}`. Once the token verifies, the connection
//! is registered with the dispatcher and notification JSON frames are pushed
//! until either side closes. Closing unregisters; a newer connection for the
//! same account replaces this one mid-flight.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::Extension,
    response::Response,
};
use serde::Deserialize;

use corpcredit_auth::{Claims, Hs256TokenCodec};

use crate::app::services::AppServices;

#[derive(Debug, Deserialize)]
struct AuthFrame {
    #[serde(rename = "type")]
    kind: String,
    token: String,
}

pub async fn notifications_socket(
    Extension(services): Extension<Arc<AppServices>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(services, socket))
}

async fn handle_socket(services: Arc<AppServices>, mut socket: WebSocket) {
    // Frames before a valid auth frame are ignored, mirroring the client
    // contract: nothing is delivered until the connection identifies itself.
    let claims = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                if let Some(claims) = parse_auth_frame(&services.codec, &text) {
                    break claims;
                }
            }
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
            Some(Ok(_)) => continue,
        }
    };

    let account_id = claims.sub;
    let (connection_id, mut notifications) = services.dispatcher.register(account_id);
    tracing::debug!(%account_id, "notification socket authenticated");

    loop {
        tokio::select! {
            pushed = notifications.recv() => {
                match pushed {
                    Some(notification) => {
                        let Ok(payload) = serde_json::to_string(&notification) else {
                            continue;
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break; // dead channel == recipient offline
                        }
                    }
                    // Sender dropped: a newer connection replaced this one.
                    None => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {} // further client frames are ignored
                }
            }
        }
    }

    services.dispatcher.unregister(connection_id);
    tracing::debug!(%account_id, "notification socket closed");
}

fn parse_auth_frame(codec: &Hs256TokenCodec, text: &str) -> Option<Claims> {
    let frame: AuthFrame = serde_json::from_str(text).ok()?;
    if frame.kind != "auth" {
        return None;
    }
    codec.decode(&frame.token).ok()
}
