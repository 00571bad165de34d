//! REST-Handler fuer /api/users

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::routes::ApiState;

/// GET /api/users
pub async fn list_users(State(state): State<ApiState>) -> Response {
    (StatusCode::OK, Json(state.benutzer.alle().to_vec())).into_response()
}

/// POST /api/users
///
/// Der Body wird unveraendert als `data` zurueckgegeben. Ein leerer Body
/// wird als `null` behandelt.
pub async fn create_user(State(state): State<ApiState>, body: Bytes) -> Response {
    let daten: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(wert) => wert,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Ungueltiger JSON-Body: {e}") })),
                )
                    .into_response();
            }
        }
    };

    let id = state.benutzer.naechste_id();
    tracing::info!(id, "Benutzer angelegt (simuliert)");

    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "message": "User created successfully",
            "data": daten,
        })),
    )
        .into_response()
}
