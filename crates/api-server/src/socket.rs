//! Socket.IO watch channel for real-time updates
//!
//! Clients emit `watch` with the scope their resolved session reads
//! (their personal scope in legacy mode, the active household
//! otherwise). Mutating routes emit `items:changed`, `members:changed`
//! and `invites:changed` to the scope's room; clients re-fetch on
//! receipt.

use serde::{Deserialize, Serialize};
use socketioxide::extract::{Data, SocketRef};
use socketioxide::{SocketIo, TransportType};
use tracing::info;

use sv_core::inventory::ItemScope;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchPayload {
    /// Scope key, e.g. `household:<id>` or `user:<uid>`.
    pub scope: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchAck {
    pub scope: String,
}

pub fn room_for_scope(scope: &ItemScope) -> String {
    room_for_key(&scope.key())
}

fn room_for_key(key: &str) -> String {
    format!("scope:{}", key)
}

/// Handle new socket connection
pub async fn on_connect(socket: SocketRef) {
    info!("Client connected: {}", socket.id);

    socket.on(
        "watch",
        |socket: SocketRef, Data(data): Data<WatchPayload>| async move {
            handle_watch(socket, data).await;
        },
    );

    socket.on_disconnect(|socket: SocketRef| async move {
        info!("Client disconnected: {}", socket.id);
    });
}

async fn handle_watch(socket: SocketRef, data: WatchPayload) {
    // Previous watches are torn down before the new one goes live, so a
    // household switch cannot leak events from the old household into
    // the new view.
    let _ = socket.leave_all();
    let _ = socket.join(room_for_key(&data.scope));
    let _ = socket.emit("watch:ready", &WatchAck { scope: data.scope });
}

/// Create and configure Socket.IO layer
pub fn create_socket_layer() -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::builder()
        // Only allow WebSocket transport to avoid CORS issues with polling
        .transports([TransportType::Websocket])
        .build_layer();

    io.ns("/", on_connect);

    (layer, io)
}
