//! Health-Check-Endpunkt fuer rtcrest
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und Anzahl offener Sitzungen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::RtcMetriken;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Sitzungslimit erreicht, neue Verbindungen werden abgelehnt
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub aktive_sitzungen: i64,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    pub metriken: RtcMetriken,
    pub max_sitzungen: usize,
}

impl HealthState {
    pub fn neu(metriken: RtcMetriken, max_sitzungen: usize) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            metriken,
            max_sitzungen,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Baut die aktuelle Health-Antwort
    pub fn antwort(&self) -> HealthResponse {
        let aktive_sitzungen = self.metriken.aktive_sitzungen.get();
        let status = if aktive_sitzungen >= self.max_sitzungen as i64 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            aktive_sitzungen,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck (auch bei degraded 200)
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.antwort()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(max: usize) -> HealthState {
        HealthState::neu(RtcMetriken::neu().unwrap(), max)
    }

    #[test]
    fn health_state_uptime_frisch() {
        assert!(state(4).uptime_seconds() < 5);
    }

    #[test]
    fn degraded_wenn_limit_erreicht() {
        let s = state(2);
        assert_eq!(s.antwort().status, HealthStatus::Healthy);
        s.metriken.aktive_sitzungen.set(2);
        let antwort = s.antwort();
        assert_eq!(antwort.status, HealthStatus::Degraded);
        assert_eq!(antwort.aktive_sitzungen, 2);
    }

    #[test]
    fn health_response_serialisierung() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            uptime_seconds: 3600,
            aktive_sitzungen: 3,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"uptime_seconds\":3600"));
        assert!(json.contains("\"aktive_sitzungen\":3"));
    }

    #[tokio::test]
    async fn health_endpunkt_antwortet() {
        let app = health_router(state(8));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        let antwort: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(antwort.status, HealthStatus::Healthy);
    }
}
