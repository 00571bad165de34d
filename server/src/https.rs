//! HTTPS-Listener
//!
//! Eigene Accept-Schleife statt `axum::serve`, damit der TLS-Handshake pro
//! Verbindung im eigenen Task laeuft und Fehlschlaege (Browser die per
//! HTTP auf den HTTPS-Port kommen, unbekanntes Zertifikat) nur auf `debug`
//! erscheinen.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::ConnectInfo, Router};
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tower::Service;

/// Obergrenze fuer den TLS-Handshake einer Verbindung
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause nach einem fehlgeschlagenen accept() (z.B. keine freien Dateideskriptoren)
const ACCEPT_PAUSE: Duration = Duration::from_millis(100);

/// HTTPS-Server: TLS-Handshake und hyper-Verbindung pro Client
pub struct HttpsServer {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    app: Router,
    handshake_timeout: Duration,
}

impl HttpsServer {
    pub fn neu(listener: TcpListener, acceptor: TlsAcceptor, app: Router) -> Self {
        Self {
            listener,
            acceptor,
            app,
            handshake_timeout: HANDSHAKE_TIMEOUT,
        }
    }

    /// Setzt die Obergrenze fuer den TLS-Handshake
    pub fn mit_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Lokale Adresse des Listeners
    pub fn adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Nimmt Verbindungen an bis der Shutdown gemeldet wird
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) {
        loop {
            let (stream, peer_addr) = tokio::select! {
                ergebnis = self.listener.accept() => match ergebnis {
                    Ok(verbindung) => verbindung,
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Accept fehlgeschlagen");
                        tokio::time::sleep(ACCEPT_PAUSE).await;
                        continue;
                    }
                },
                geaendert = shutdown_rx.changed() => {
                    if geaendert.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            };

            let acceptor = self.acceptor.clone();
            let app = self.app.clone();
            let handshake_timeout = self.handshake_timeout;

            tokio::spawn(async move {
                let tls_stream =
                    match tokio::time::timeout(handshake_timeout, acceptor.accept(stream)).await {
                        Ok(Ok(s)) => s,
                        Ok(Err(e)) => {
                            tracing::debug!(peer = %peer_addr, fehler = %e, "TLS-Handshake fehlgeschlagen");
                            return;
                        }
                        Err(_) => {
                            tracing::debug!(peer = %peer_addr, "TLS-Handshake abgelaufen");
                            return;
                        }
                    };

                let service = hyper::service::service_fn(move |mut anfrage: Request<Incoming>| {
                    anfrage.extensions_mut().insert(ConnectInfo(peer_addr));
                    app.clone().call(anfrage)
                });

                if let Err(e) = auto::Builder::new(TokioExecutor::new())
                    .serve_connection_with_upgrades(TokioIo::new(tls_stream), service)
                    .await
                {
                    tracing::debug!(peer = %peer_addr, fehler = %e, "HTTPS-Verbindung beendet");
                }
            });
        }

        tracing::info!("HTTPS-Listener gestoppt");
    }
}
