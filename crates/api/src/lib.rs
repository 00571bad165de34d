//! rtcrest-api – Emulierte REST-API
//!
//! Die Endpunkte sind echte Axum-Handler. Anfragen die als JSON-Umschlag
//! ueber den DataChannel eintreffen, werden vom [`RestDispatcher`] in
//! `http::Request`s uebersetzt und in-process durch denselben Router
//! geschickt. Dadurch verhaelt sich die API ueber HTTPS und ueber den
//! DataChannel identisch.
//!
//! ## Endpunkte
//! - `GET  /api/users`  – Benutzerliste
//! - `POST /api/users`  – Benutzer "anlegen" (Echo des Bodys)
//! - `*    /api/health` – Health-Status

pub mod benutzer;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod routes;

pub use benutzer::{Benutzer, BenutzerVerzeichnis};
pub use dispatcher::RestDispatcher;
pub use error::{ApiError, ApiResult};
pub use routes::{api_router, ApiState};
