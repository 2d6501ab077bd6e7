use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{debug, error, info};

use crate::state::ServerState;

/// Streaming rate for the annotated video feed.
const VIDEO_FEED_FPS: u64 = 15;

/// Handle WebSocket upgrade for the detection feed
pub async fn detection_feed(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    ws.on_upgrade(|socket| detection_socket(socket, state))
}

/// One detection feed connection: status frame first, then every
/// published event in order, with `get_latest` replays on request.
async fn detection_socket(socket: WebSocket, state: Arc<ServerState>) {
    let (mut sender, mut receiver) = socket.split();

    let status = json!({
        "type": "status",
        "mode": state.config.mode,
        "camera_enabled": state.vision_active(),
        "rssi_enabled": state.config.rssi.enabled,
        "csi_enabled": state.config.csi.enabled,
        "monitor_enabled": state.config.monitor.enabled,
    });
    if sender
        .send(Message::Text(status.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    let (id, mut frames) = state.hub.subscribe();
    info!(
        "Feed subscriber connected. Total: {}",
        state.hub.subscriber_count()
    );

    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Some(frame) => {
                        if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    // Pruned by the hub (slow consumer): close out.
                    None => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.as_str().trim() == "get_latest" {
                            if let Some(latest) = state.hub.latest_frame() {
                                if sender.send(Message::Text(latest.to_string().into())).await.is_err() {
                                    break;
                                }
                            }
                        } else {
                            debug!("Ignoring unknown feed command: {}", text.as_str());
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Feed socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    state.hub.unsubscribe(id);
    info!(
        "Feed subscriber disconnected. Total: {}",
        state.hub.subscriber_count()
    );
}

/// Handle WebSocket upgrade for the annotated video feed
pub async fn video_feed(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(|socket| video_socket(socket, state))
}

/// Streams the backend's annotated frames as base64 JPEG at a fixed
/// rate, independent of the detection feed.
async fn video_socket(socket: WebSocket, state: Arc<ServerState>) {
    let (mut sender, mut receiver) = socket.split();

    if !state.vision_active() {
        let _ = sender
            .send(Message::Text(
                json!({"error": "camera not enabled"}).to_string().into(),
            ))
            .await;
        return;
    }

    info!("Video feed connected");
    let mut ticker = tokio::time::interval(Duration::from_millis(1000 / VIDEO_FEED_FPS));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(frame) = state.latest_video_frame() {
                    let payload = json!({
                        "frame": BASE64.encode(&frame.jpeg),
                        "timestamp": frame.timestamp,
                    });
                    if sender.send(Message::Text(payload.to_string().into())).await.is_err() {
                        break;
                    }
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Video socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!("Video feed disconnected");
}
