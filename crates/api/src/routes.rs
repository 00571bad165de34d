//! Route-Definitionen der emulierten API (/api/...)

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};

use crate::benutzer::BenutzerVerzeichnis;
use crate::handlers;

/// Axum-State der API
#[derive(Debug, Clone, Default)]
pub struct ApiState {
    pub benutzer: Arc<BenutzerVerzeichnis>,
}

impl ApiState {
    pub fn neu(benutzer: BenutzerVerzeichnis) -> Self {
        Self {
            benutzer: Arc::new(benutzer),
        }
    }
}

/// Erstellt den vollstaendigen /api/-Router
///
/// Unbekannte Pfade liefern 404 mit dem angefragten Endpunkt, falsche
/// Methoden auf `/api/users` liefern 405. HEAD zaehlt dabei als falsche
/// Methode und wird nicht an den GET-Handler weitergereicht.
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users)
                .head(handlers::methode_nicht_erlaubt)
                .post(handlers::users::create_user)
                .fallback(handlers::methode_nicht_erlaubt),
        )
        .route("/api/health", any(handlers::health::health))
        .fallback(handlers::nicht_gefunden)
        .with_state(state)
}
