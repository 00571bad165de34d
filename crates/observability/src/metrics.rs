//! Prometheus-kompatible Metriken fuer rtcrest
//!
//! Registrierte Metriken:
//! - `rtcrest_active_sessions` – Gauge: Offene Signaling-Sitzungen
//! - `rtcrest_sessions_total` – Counter: Angenommene Sitzungen
//! - `rtcrest_sessions_rejected_total` – Counter: Wegen Limit abgelehnte Sitzungen
//! - `rtcrest_signal_messages_total` – Counter: Signaling-Nachrichten (type, direction)
//! - `rtcrest_rest_requests_total` – Counter: REST-Anfragen ueber DataChannel (status)
//! - `rtcrest_rtp_packets_echoed_total` – Counter: Zurueckgesendete RTP-Pakete (kind)

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle rtcrest-Prometheus-Metriken
///
/// Clone teilt die Registry und alle Zaehler.
#[derive(Clone)]
pub struct RtcMetriken {
    pub registry: Arc<Registry>,

    pub aktive_sitzungen: IntGauge,
    pub sitzungen_total: IntCounter,
    pub abgelehnte_sitzungen_total: IntCounter,
    pub signal_nachrichten_total: IntCounterVec,
    pub rest_anfragen_total: IntCounterVec,
    pub rtp_pakete_total: IntCounterVec,
}

impl RtcMetriken {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let aktive_sitzungen = IntGauge::with_opts(Opts::new(
            "rtcrest_active_sessions",
            "Anzahl offener Signaling-Sitzungen",
        ))?;
        registry.register(Box::new(aktive_sitzungen.clone()))?;

        let sitzungen_total = IntCounter::with_opts(Opts::new(
            "rtcrest_sessions_total",
            "Gesamtanzahl angenommener Sitzungen",
        ))?;
        registry.register(Box::new(sitzungen_total.clone()))?;

        let abgelehnte_sitzungen_total = IntCounter::with_opts(Opts::new(
            "rtcrest_sessions_rejected_total",
            "Wegen Sitzungslimit abgelehnte WebSocket-Verbindungen",
        ))?;
        registry.register(Box::new(abgelehnte_sitzungen_total.clone()))?;

        let signal_nachrichten_total = IntCounterVec::new(
            Opts::new(
                "rtcrest_signal_messages_total",
                "Signaling-Nachrichten nach Typ und Richtung",
            ),
            &["type", "direction"],
        )?;
        registry.register(Box::new(signal_nachrichten_total.clone()))?;

        let rest_anfragen_total = IntCounterVec::new(
            Opts::new(
                "rtcrest_rest_requests_total",
                "REST-Anfragen ueber den DataChannel nach Statuscode",
            ),
            &["status"],
        )?;
        registry.register(Box::new(rest_anfragen_total.clone()))?;

        let rtp_pakete_total = IntCounterVec::new(
            Opts::new(
                "rtcrest_rtp_packets_echoed_total",
                "Zurueckgesendete RTP-Pakete nach Medienart",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(rtp_pakete_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            aktive_sitzungen,
            sitzungen_total,
            abgelehnte_sitzungen_total,
            signal_nachrichten_total,
            rest_anfragen_total,
            rtp_pakete_total,
        })
    }

    /// Zaehlt eine eingehende Signaling-Nachricht
    pub fn signal_empfangen(&self, typ: &str) {
        self.signal_nachrichten_total
            .with_label_values(&[typ, "in"])
            .inc();
    }

    /// Zaehlt eine ausgehende Signaling-Nachricht
    pub fn signal_gesendet(&self, typ: &str) {
        self.signal_nachrichten_total
            .with_label_values(&[typ, "out"])
            .inc();
    }

    /// Zaehlt eine beantwortete REST-Anfrage
    pub fn rest_beantwortet(&self, status: u16) {
        self.rest_anfragen_total
            .with_label_values(&[&status.to_string()])
            .inc();
    }

    /// Zaehlt ein zurueckgesendetes RTP-Paket (`kind`: "audio" / "video")
    pub fn rtp_zurueckgesendet(&self, kind: &str) {
        self.rtp_pakete_total.with_label_values(&[kind]).inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for RtcMetriken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtcMetriken")
            .field("aktive_sitzungen", &self.aktive_sitzungen.get())
            .finish_non_exhaustive()
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: RtcMetriken) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<RtcMetriken>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
