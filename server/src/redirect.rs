//! HTTP -> HTTPS Umleitung
//!
//! Browser die `http://host:8081/...` aufrufen werden dauerhaft auf den
//! HTTPS-Port umgeleitet.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};

/// Router der jede Anfrage umleitet
pub fn redirect_router(https_port: u16) -> Router {
    Router::new().fallback(umleiten).with_state(https_port)
}

async fn umleiten(State(https_port): State<u16>, headers: HeaderMap, uri: Uri) -> Response {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.host())
        .unwrap_or("localhost");

    let ziel = redirect_ziel(host, &uri, https_port);
    tracing::debug!(von = %uri, nach = %ziel, "HTTP-Anfrage umgeleitet");

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, ziel)]).into_response()
}

/// Baut die HTTPS-Ziel-URL: `https://<host ohne port>:<https_port><pfad>[?query]`
pub fn redirect_ziel(host: &str, uri: &Uri, https_port: u16) -> String {
    let pfad = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("https://{}:{https_port}{pfad}", host_ohne_port(host))
}

/// Entfernt einen Port aus dem Host-Header, IPv6-Literale bleiben geklammert
fn host_ohne_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(ende) => &host[..=ende],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, _)) => name,
        None => host,
    }
}
