//! Signaling-Verbindung – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede WebSocket-Verbindung bekommt eine `SignalVerbindung` in einem
//! eigenen tokio-Task und besitzt fuer ihre Lebensdauer eine PeerSitzung.
//!
//! ## Ende der Verbindung
//! - Browser schliesst den WebSocket oder Lesefehler
//! - Text-Frame ist kein JSON
//! - PeerConnection wechselt nach `Failed` oder `Closed`
//! - Server-Shutdown
//!
//! ## Keepalive
//! Server sendet alle `keepalive_sek` einen WebSocket-Ping.

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use rtcrest_core::SitzungsId;
use rtcrest_media::sitzung::ist_beendet;
use rtcrest_observability::RtcMetriken;
use rtcrest_protocol::SignalNachricht;
use tokio::sync::mpsc;

use crate::dispatcher::SignalDispatcher;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::{SignalingState, SitzungsPlatz};

// ---------------------------------------------------------------------------
// SignalVerbindung
// ---------------------------------------------------------------------------

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct SignalVerbindung {
    state: Arc<SignalingState>,
    peer: Option<SocketAddr>,
    _platz: SitzungsPlatz,
}

impl SignalVerbindung {
    /// Erstellt eine neue Verbindung auf einem reservierten Sitzungsplatz
    pub fn neu(state: Arc<SignalingState>, peer: Option<SocketAddr>, platz: SitzungsPlatz) -> Self {
        Self {
            state,
            peer,
            _platz: platz,
        }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung endet. Danach wird die PeerConnection
    /// geschlossen und der Sitzungsplatz freigegeben.
    pub async fn verarbeiten<Si, St, E>(self, mut sink: Si, mut stream: St)
    where
        Si: Sink<Message> + Unpin,
        Si::Error: Display,
        St: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let id = SitzungsId::new();
        let kurz = id.kurz();
        let peer = self.peer;
        let metriken = &self.state.metriken;

        tracing::info!(sitzung = %kurz, peer = ?peer, "Neue Signaling-Verbindung");

        // Ausgehende Nachrichten der PeerSitzung (lokale ICE-Kandidaten)
        let (ausgang_tx, mut ausgang_rx) = mpsc::channel::<SignalNachricht>(64);

        let sitzung = match self.state.rtc.sitzung_erstellen(id, ausgang_tx).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(sitzung = %kurz, fehler = %e, "PeerSitzung konnte nicht erstellt werden");
                let _ = sink.close().await;
                return;
            }
        };

        let dispatcher = SignalDispatcher::neu(&sitzung, metriken);
        let mut zustand = sitzung.zustand();
        let mut shutdown_rx = self.state.shutdown();

        let keepalive = Duration::from_secs(self.state.config.keepalive_sek.max(1));
        let mut keepalive_takt = tokio::time::interval_at(
            tokio::time::Instant::now() + keepalive,
            keepalive,
        );

        loop {
            tokio::select! {
                // Eingehender Frame vom Browser
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            match dispatcher.text_verarbeiten(&text).await {
                                Ok(Some(antwort)) => {
                                    if let Err(e) = senden(&mut sink, &antwort, metriken).await {
                                        tracing::warn!(sitzung = %kurz, fehler = %e, "Antwort nicht gesendet");
                                        break;
                                    }
                                }
                                Ok(None) => {}
                                Err(e) if e.ist_fatal() => {
                                    tracing::warn!(sitzung = %kurz, fehler = %e, "Ungueltige Nachricht, Verbindung wird getrennt");
                                    break;
                                }
                                Err(SignalingError::Protokoll(e)) => {
                                    tracing::debug!(sitzung = %kurz, fehler = %e, "Nachricht unbekannter Form ignoriert");
                                }
                                Err(e) => {
                                    tracing::warn!(sitzung = %kurz, fehler = %e, "Signaling-Operation fehlgeschlagen");
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(sitzung = %kurz, "Verbindung vom Browser getrennt");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Binaer, Ping, Pong
                        }
                        Some(Err(e)) => {
                            tracing::warn!(sitzung = %kurz, fehler = %e, "WebSocket-Lesefehler");
                            break;
                        }
                    }
                }

                // Lokale ICE-Kandidaten an den Browser
                Some(ausgehend) = ausgang_rx.recv() => {
                    if let Err(e) = senden(&mut sink, &ausgehend, metriken).await {
                        tracing::warn!(sitzung = %kurz, fehler = %e, "Kandidat nicht gesendet");
                        break;
                    }
                }

                // Keepalive-Ping
                _ = keepalive_takt.tick() => {
                    if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                        tracing::debug!(sitzung = %kurz, fehler = %e, "Keepalive fehlgeschlagen");
                        break;
                    }
                }

                // PeerConnection gescheitert oder geschlossen
                geaendert = zustand.changed() => {
                    if geaendert.is_err() {
                        break;
                    }
                    let aktuell = *zustand.borrow_and_update();
                    if ist_beendet(aktuell) {
                        tracing::info!(sitzung = %kurz, zustand = %aktuell, "PeerConnection beendet, Verbindung wird getrennt");
                        break;
                    }
                }

                // Server-Shutdown
                geaendert = shutdown_rx.changed() => {
                    if geaendert.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!(sitzung = %kurz, "Shutdown, Verbindung wird getrennt");
                        let _ = sink
                            .send(Message::Close(Some(CloseFrame {
                                code: close_code::AWAY,
                                reason: "Server wird beendet".into(),
                            })))
                            .await;
                        break;
                    }
                }
            }
        }

        if let Err(e) = sitzung.schliessen().await {
            tracing::warn!(sitzung = %kurz, fehler = %e, "PeerSitzung nicht sauber geschlossen");
        }
        let _ = sink.close().await;

        tracing::info!(sitzung = %kurz, peer = ?peer, "Signaling-Verbindung beendet");
    }
}

async fn senden<Si>(
    sink: &mut Si,
    nachricht: &SignalNachricht,
    metriken: &RtcMetriken,
) -> SignalingResult<()>
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    let json = nachricht.zu_json()?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| SignalingError::SendFehler(e.to_string()))?;
    metriken.signal_gesendet(nachricht.typ());
    Ok(())
}
