//! rtcrest-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod https;
pub mod redirect;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use config::ServerConfig;
use rtcrest_api::{api_router, ApiState, RestDispatcher};
use rtcrest_crypto::{
    crypto_provider_installieren, zertifikat_sicherstellen, TlsServer, ZertifikatOptionen,
    ZertifikatQuelle,
};
use rtcrest_media::RtcApi;
use rtcrest_observability::{HealthState, RtcMetriken};
use rtcrest_signaling::SignalingState;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::https::HttpsServer;
use crate::redirect::redirect_router;

/// Alle verdrahteten Dienste hinter dem HTTPS-Listener
pub struct Dienste {
    pub app: Router,
    pub signaling: Arc<SignalingState>,
    pub metriken: RtcMetriken,
}

/// Baut Metriken, API, WebRTC und Signaling auf und verdrahtet den Router
pub fn dienste_aufbauen(
    config: &ServerConfig,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<Dienste> {
    let metriken = RtcMetriken::neu()?;

    let api_state = ApiState::default();
    let dispatcher = RestDispatcher::neu(api_router(api_state.clone()));

    let rtc = RtcApi::neu(config.media.clone(), dispatcher, metriken.clone())
        .context("WebRTC-API konnte nicht initialisiert werden")?;

    let signaling = SignalingState::neu(
        config.signaling_config(),
        rtc,
        metriken.clone(),
        shutdown_rx,
    );

    let health = HealthState::neu(metriken.clone(), config.server.max_sitzungen);
    let app = routes::app_router(api_state, Arc::clone(&signaling), metriken.clone(), health);

    Ok(Dienste {
        app,
        signaling,
        metriken,
    })
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Zertifikat sicherstellen (ggf. selbstsigniert erzeugen)
    /// 2. Dienste aufbauen (API, WebRTC, Signaling, Metriken)
    /// 3. HTTPS-Listener starten
    /// 4. HTTP-Umleitung starten (optional)
    /// 5. Auf Ctrl-C warten, dann alle Listener und Verbindungen beenden
    pub async fn starten(self) -> Result<()> {
        let config = self.config;

        crypto_provider_installieren();

        let pfade = config.tls_pfade();
        match zertifikat_sicherstellen(&pfade, &ZertifikatOptionen::default())? {
            ZertifikatQuelle::Wiederverwendet => {
                tracing::info!(
                    zertifikat = %pfade.zertifikat.display(),
                    "Vorhandenes Zertifikat wird verwendet"
                );
            }
            ZertifikatQuelle::Erzeugt { fingerprint } => {
                tracing::info!(
                    zertifikat = %pfade.zertifikat.display(),
                    schluessel = %pfade.schluessel.display(),
                    fingerprint = %fingerprint,
                    "Selbstsigniertes Zertifikat erzeugt"
                );
            }
        }
        let tls = TlsServer::aus_dateien(&pfade)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let dienste = dienste_aufbauen(&config, shutdown_rx.clone())?;

        let https_adresse = config.https_bind_adresse();
        let listener = TcpListener::bind(&https_adresse)
            .await
            .with_context(|| format!("HTTPS-Port {https_adresse} nicht verfuegbar"))?;
        let https = HttpsServer::neu(listener, tls.acceptor.clone(), dienste.app);
        let https_task = tokio::spawn(https.starten(shutdown_rx.clone()));

        let redirect_task = if config.netzwerk.redirect_aktiviert {
            let http_adresse = config.http_bind_adresse();
            let listener = TcpListener::bind(&http_adresse)
                .await
                .with_context(|| format!("HTTP-Port {http_adresse} nicht verfuegbar"))?;
            let mut redirect_shutdown = shutdown_rx.clone();
            let app = redirect_router(config.netzwerk.https_port);
            Some(tokio::spawn(async move {
                let ergebnis = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = redirect_shutdown.wait_for(|beendet| *beendet).await;
                    })
                    .await;
                if let Err(e) = ergebnis {
                    tracing::error!(fehler = %e, "HTTP-Umleitung abgebrochen");
                }
            }))
        } else {
            None
        };

        tracing::info!(
            server_name = %config.server.name,
            https = %https_adresse,
            fingerprint = %tls.fingerprint(),
            max_sitzungen = config.server.max_sitzungen,
            "Server laeuft"
        );
        tracing::info!(
            "Demo-Seite: https://localhost:{}/",
            config.netzwerk.https_port
        );
        tracing::info!(
            "WebSocket-Test: https://localhost:{}/ws-test",
            config.netzwerk.https_port
        );
        if config.netzwerk.redirect_aktiviert {
            tracing::info!(
                "HTTP-Umleitung: http://localhost:{} -> https",
                config.netzwerk.http_port
            );
        }

        tracing::info!("Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!(
            aktive_sitzungen = dienste.signaling.aktive_sitzungen(),
            "Shutdown-Signal empfangen, Server wird beendet"
        );

        let _ = shutdown_tx.send(true);
        let _ = https_task.await;
        if let Some(task) = redirect_task {
            let _ = task.await;
        }

        tracing::info!(
            sitzungen_total = dienste.metriken.sitzungen_total.get(),
            "Server beendet"
        );
        Ok(())
    }
}
