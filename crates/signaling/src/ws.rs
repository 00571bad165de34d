//! `/ws`-Endpunkt

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::StreamExt;

use crate::connection::SignalVerbindung;
use crate::server_state::SignalingState;

/// Router mit der Signaling-Route
pub fn signaling_router(state: Arc<SignalingState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// WebSocket-Upgrade; ueber dem Sitzungslimit wird mit 503 abgelehnt
pub async fn ws_handler(
    State(state): State<Arc<SignalingState>>,
    verbindung: Option<ConnectInfo<SocketAddr>>,
    ws: WebSocketUpgrade,
) -> Response {
    let peer = verbindung.map(|ConnectInfo(addr)| addr);

    let Some(platz) = state.platz_reservieren() else {
        tracing::warn!(
            peer = ?peer,
            max = state.config.max_sitzungen,
            "Sitzungslimit erreicht, WebSocket abgelehnt"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Server ist voll").into_response();
    };

    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        SignalVerbindung::neu(state, peer, platz)
            .verarbeiten(sink, stream)
            .await;
    })
}
