//! Routen des HTTPS-Servers

use std::sync::Arc;

use axum::{response::Html, routing::get, Router};
use rtcrest_api::{api_router, ApiState};
use rtcrest_observability::{
    health_router, metrics_router, request_tracing_layer, HealthState, RtcMetriken,
};
use rtcrest_signaling::{signaling_router, SignalingState};

/// Antworttext von `/ws-test`
pub const WS_TEST_TEXT: &str =
    "WebSocket endpoint is working. Certificate accepted for WSS connections.";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Baut den vollstaendigen Router
///
/// - `/`          Demo-Seite
/// - `/ws`        Signaling
/// - `/ws-test`   Zertifikatspruefung fuer WSS
/// - `/api/...`   REST-API (auch ueber den DataChannel erreichbar)
/// - `/metrics`, `/health`
pub fn app_router(
    api: ApiState,
    signaling: Arc<SignalingState>,
    metriken: RtcMetriken,
    health: HealthState,
) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws-test", get(ws_test))
        .merge(signaling_router(signaling))
        .merge(metrics_router(metriken))
        .merge(health_router(health))
        .merge(api_router(api))
        .layer(request_tracing_layer())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ws_test() -> &'static str {
    WS_TEST_TEXT
}
