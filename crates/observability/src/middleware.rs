//! Request-Tracing fuer Axum
//!
//! Jede HTTP-Anfrage bekommt einen Span mit Methode und Pfad; Statuscode
//! und Dauer werden beim Abschluss geloggt.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Erstellt den Axum-Layer fuer Request-Tracing.
pub fn request_tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}
