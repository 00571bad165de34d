//! REST-Handler der emulierten API

pub mod health;
pub mod users;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

/// Body der 404-Antwort fuer einen unbekannten Endpunkt
pub fn nicht_gefunden_body(endpoint: &str) -> Value {
    json!({ "error": "Endpoint not found", "endpoint": endpoint })
}

/// Fallback fuer unbekannte Pfade
pub async fn nicht_gefunden(uri: Uri) -> Response {
    let endpoint = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    tracing::debug!(endpoint = %endpoint, "Unbekannter Endpunkt");
    (StatusCode::NOT_FOUND, Json(nicht_gefunden_body(&endpoint))).into_response()
}

/// Fallback fuer bekannte Pfade mit falscher Methode
pub async fn methode_nicht_erlaubt() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}
