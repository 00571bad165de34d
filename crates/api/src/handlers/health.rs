//! REST-Handler fuer /api/health

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Antwort des API-Health-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    /// RFC3339-Zeitstempel (UTC, Sekundengenau)
    pub timestamp: String,
    pub version: String,
}

impl ApiHealth {
    pub fn jetzt() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// * /api/health – beantwortet jede Methode
pub async fn health() -> Response {
    (StatusCode::OK, Json(ApiHealth::jetzt())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeitstempel_ist_rfc3339_utc() {
        let h = ApiHealth::jetzt();
        assert_eq!(h.status, "healthy");
        assert!(h.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&h.timestamp).is_ok());
        assert!(!h.version.is_empty());
    }
}
