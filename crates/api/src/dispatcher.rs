//! REST-Dispatcher – Uebersetzt DataChannel-Umschlaege in HTTP-Anfragen
//!
//! ```text
//! RestAnfrage --(http_anfrage_bauen)--> http::Request
//!     |                                      |
//!     |                              Router::oneshot
//!     v                                      v
//! RestAntwort <--(antwort_umwandeln)-- http::Response
//! ```

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, Response, Uri},
    Router,
};
use rtcrest_protocol::{RestAnfrage, RestAntwort, JSON_CONTENT_TYPE};
use serde_json::Value;
use tower::ServiceExt;

use crate::error::{ApiError, ApiResult};
use crate::handlers::nicht_gefunden_body;

/// Platzhalter fuer Anfragen ohne Methode
///
/// Passt auf keine methodengebundene Route: `/api/users` antwortet mit 405,
/// `/api/health` wie bei jeder anderen Methode.
const OHNE_METHODE: &str = "NONE";

/// Obergrenze fuer Antwort-Bodies (DataChannel-Nachrichten sollten klein bleiben)
const MAX_ANTWORT_BYTES: usize = 256 * 1024;

/// Leitet REST-Umschlaege durch einen Axum-Router
#[derive(Clone)]
pub struct RestDispatcher {
    router: Router,
}

impl RestDispatcher {
    /// Erstellt einen Dispatcher fuer den gegebenen Router
    pub fn neu(router: Router) -> Self {
        Self { router }
    }

    /// Verarbeitet eine Anfrage und gibt immer eine Antwort zurueck
    ///
    /// Uebersetzungsfehler werden zu 4xx/5xx-Antworten; die `id` der
    /// Anfrage wird in jedem Fall uebernommen.
    pub async fn verarbeiten(&self, anfrage: RestAnfrage) -> RestAntwort {
        let id = anfrage.id.clone();
        let methode = anfrage.methode();
        let endpoint = anfrage.endpoint.clone();

        let antwort = match self.weiterleiten(anfrage).await {
            Ok(antwort) => antwort,
            Err(e) => {
                tracing::warn!(fehler = %e, "REST-Anfrage konnte nicht uebersetzt werden");
                RestAntwort::fehler(e.http_status(), e.to_string())
            }
        };

        tracing::info!(
            method = %methode,
            endpoint = %endpoint,
            status = antwort.status,
            "REST-Anfrage ueber DataChannel verarbeitet"
        );

        antwort.mit_id(id)
    }

    async fn weiterleiten(&self, anfrage: RestAnfrage) -> ApiResult<RestAntwort> {
        let Some(request) = http_anfrage_bauen(&anfrage)? else {
            return Ok(RestAntwort::json(404, nicht_gefunden_body(&anfrage.endpoint)));
        };

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        antwort_umwandeln(response).await
    }
}

impl std::fmt::Debug for RestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestDispatcher").finish_non_exhaustive()
    }
}

/// Baut aus dem Umschlag eine `http::Request`
///
/// Gibt `Ok(None)` zurueck wenn der Endpunkt kein Pfad ist; dafuer gibt es
/// keine Route und die Anfrage endet als 404.
pub fn http_anfrage_bauen(anfrage: &RestAnfrage) -> ApiResult<Option<Request<Body>>> {
    let methode_text = anfrage.methode();
    let methode_text = if methode_text.is_empty() {
        OHNE_METHODE.to_string()
    } else {
        methode_text
    };
    let methode = Method::from_bytes(methode_text.as_bytes())
        .map_err(|_| ApiError::UngueltigeMethode(anfrage.method.clone()))?;

    if !anfrage.endpoint.starts_with('/') {
        return Ok(None);
    }
    let Ok(uri) = anfrage.endpoint.parse::<Uri>() else {
        return Ok(None);
    };

    let mut request = Request::builder()
        .method(methode)
        .uri(uri)
        .body(koerper_bauen(&anfrage.body)?)
        .map_err(|e| ApiError::Intern(e.to_string()))?;

    let headers = request.headers_mut();
    for (name, wert) in &anfrage.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::UngueltigerHeader {
                name: name.clone(),
                grund: e.to_string(),
            })?;
        let header_wert = HeaderValue::from_str(wert).map_err(|e| ApiError::UngueltigerHeader {
            name: name.clone(),
            grund: e.to_string(),
        })?;
        headers.append(header_name, header_wert);
    }
    if !anfrage.body.is_null() && !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
    }

    Ok(Some(request))
}

fn koerper_bauen(body: &Value) -> ApiResult<Body> {
    if body.is_null() {
        return Ok(Body::empty());
    }
    let bytes = serde_json::to_vec(body).map_err(|e| ApiError::UngueltigerBody(e.to_string()))?;
    Ok(Body::from(bytes))
}

/// Wandelt eine `http::Response` in einen Antwort-Umschlag um
pub async fn antwort_umwandeln(response: Response<Body>) -> ApiResult<RestAntwort> {
    let (teile, body) = response.into_parts();

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, wert) in &teile.headers {
        if name == header::CONTENT_LENGTH {
            continue;
        }
        let wert = String::from_utf8_lossy(wert.as_bytes()).into_owned();
        headers
            .entry(header_name_kanonisch(name.as_str()))
            .and_modify(|bestehend| {
                bestehend.push_str(", ");
                bestehend.push_str(&wert);
            })
            .or_insert(wert);
    }

    let bytes = axum::body::to_bytes(body, MAX_ANTWORT_BYTES)
        .await
        .map_err(|e| ApiError::Intern(format!("Antwort-Body nicht lesbar: {e}")))?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(RestAntwort {
        status: teile.status.as_u16(),
        headers,
        body,
        id: None,
    })
}

/// `content-type` -> `Content-Type`
pub fn header_name_kanonisch(name: &str) -> String {
    name.split('-')
        .map(|teil| {
            let mut zeichen = teil.chars();
            match zeichen.next() {
                Some(erstes) => erstes.to_ascii_uppercase().to_string() + zeichen.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_namen_kanonisieren() {
        assert_eq!(header_name_kanonisch("content-type"), "Content-Type");
        assert_eq!(header_name_kanonisch("x-request-id"), "X-Request-Id");
        assert_eq!(header_name_kanonisch("etag"), "Etag");
    }

    #[test]
    fn anfrage_mit_body_bekommt_content_type() {
        let anfrage = RestAnfrage::neu("post", "/api/users").mit_body(json!({"name": "Max"}));
        let request = http_anfrage_bauen(&anfrage).unwrap().unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().path(), "/api/users");
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
    }

    #[test]
    fn anfrage_ohne_body_hat_keinen_content_type() {
        let anfrage = RestAnfrage::neu("GET", "/api/users?limit=1");
        let request = http_anfrage_bauen(&anfrage).unwrap().unwrap();
        assert!(request.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(request.uri().query(), Some("limit=1"));
    }

    #[test]
    fn eigene_header_werden_uebernommen() {
        let mut anfrage = RestAnfrage::neu("GET", "/api/health");
        anfrage
            .headers
            .insert("X-Trace".to_string(), "abc".to_string());
        let request = http_anfrage_bauen(&anfrage).unwrap().unwrap();
        assert_eq!(request.headers().get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn ungueltige_methode_ist_fehler() {
        let anfrage = RestAnfrage::neu("GE T", "/api/users");
        assert!(matches!(
            http_anfrage_bauen(&anfrage),
            Err(ApiError::UngueltigeMethode(_))
        ));
    }

    #[test]
    fn ungueltiger_header_ist_fehler() {
        let mut anfrage = RestAnfrage::neu("GET", "/api/users");
        anfrage
            .headers
            .insert("Kein Header".to_string(), "x".to_string());
        assert!(matches!(
            http_anfrage_bauen(&anfrage),
            Err(ApiError::UngueltigerHeader { .. })
        ));
    }

    #[test]
    fn leere_methode_wird_platzhalter() {
        let anfrage = RestAnfrage::neu("", "/api/health");
        let request = http_anfrage_bauen(&anfrage).unwrap().unwrap();
        assert_eq!(request.method().as_str(), OHNE_METHODE);
    }

    #[test]
    fn endpunkt_ohne_schraegstrich_hat_keine_route() {
        let anfrage = RestAnfrage::neu("GET", "api/users");
        assert!(http_anfrage_bauen(&anfrage).unwrap().is_none());
    }

    #[tokio::test]
    async fn leerer_antwort_body_wird_null() {
        let response = Response::builder()
            .status(204)
            .body(Body::empty())
            .unwrap();
        let antwort = antwort_umwandeln(response).await.unwrap();
        assert_eq!(antwort.status, 204);
        assert_eq!(antwort.body, Value::Null);
    }

    #[tokio::test]
    async fn text_body_wird_json_string() {
        let response = Response::builder()
            .status(200)
            .header("content-type", "text/plain")
            .header("content-length", "5")
            .body(Body::from("hallo"))
            .unwrap();
        let antwort = antwort_umwandeln(response).await.unwrap();
        assert_eq!(antwort.body, json!("hallo"));
        assert_eq!(antwort.headers.get("Content-Type").unwrap(), "text/plain");
        assert!(!antwort.headers.contains_key("Content-Length"));
    }
}
