//! PeerSitzung – eine RTCPeerConnection pro Signaling-Verbindung

use std::sync::Arc;

use rtcrest_core::SitzungsId;
use rtcrest_protocol::SignalNachricht;
use tokio::sync::{mpsc, watch};
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

use crate::datenkanal;
use crate::echo;
use crate::engine::SitzungsKontext;
use crate::error::MediaResult;

/// Eine aktive WebRTC-Sitzung
///
/// Lebt so lange wie die zugehoerige WebSocket-Verbindung. Beim Verlassen
/// der Signaling-Schleife muss [`PeerSitzung::schliessen`] aufgerufen
/// werden.
pub struct PeerSitzung {
    id: SitzungsId,
    pc: Arc<RTCPeerConnection>,
    zustand_rx: watch::Receiver<RTCPeerConnectionState>,
}

impl PeerSitzung {
    pub(crate) async fn aufbauen(
        id: SitzungsId,
        pc: Arc<RTCPeerConnection>,
        kontext: Arc<SitzungsKontext>,
        ausgang: mpsc::Sender<SignalNachricht>,
    ) -> MediaResult<Self> {
        let kurz = id.kurz();

        // Lokale ICE-Kandidaten an den Browser weiterreichen
        let ice_kurz = kurz.clone();
        pc.on_ice_candidate(Box::new(move |kandidat: Option<RTCIceCandidate>| {
            let ausgang = ausgang.clone();
            let sitzung = ice_kurz.clone();
            Box::pin(async move {
                let Some(kandidat) = kandidat else {
                    tracing::debug!(sitzung = %sitzung, "ICE-Sammlung abgeschlossen");
                    return;
                };
                match kandidat.to_json() {
                    Ok(init) => {
                        let nachricht = SignalNachricht::IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_mline_index: init.sdp_mline_index,
                            username_fragment: init.username_fragment,
                        };
                        if ausgang.send(nachricht).await.is_err() {
                            tracing::debug!(
                                sitzung = %sitzung,
                                "Signaling-Ausgang geschlossen, Kandidat verworfen"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(sitzung = %sitzung, fehler = %e, "ICE-Kandidat nicht serialisierbar");
                    }
                }
            })
        }));

        let (zustand_tx, zustand_rx) = watch::channel(RTCPeerConnectionState::New);
        let zustand_kurz = kurz.clone();
        pc.on_peer_connection_state_change(Box::new(move |zustand: RTCPeerConnectionState| {
            tracing::info!(sitzung = %zustand_kurz, zustand = %zustand, "Peer-Verbindungszustand geaendert");
            zustand_tx.send_replace(zustand);
            Box::pin(async {})
        }));

        let ice_zustand_kurz = kurz.clone();
        pc.on_ice_connection_state_change(Box::new(move |zustand: RTCIceConnectionState| {
            tracing::info!(sitzung = %ice_zustand_kurz, zustand = %zustand, "ICE-Verbindungszustand geaendert");
            Box::pin(async {})
        }));

        // Vom Browser angelegte DataChannels
        let dc_kontext = Arc::clone(&kontext);
        let dc_kurz = kurz.clone();
        pc.on_data_channel(Box::new(move |kanal: Arc<RTCDataChannel>| {
            datenkanal::binden(
                kanal,
                dc_kontext.dispatcher.clone(),
                dc_kontext.metriken.clone(),
                dc_kurz.clone(),
            );
            Box::pin(async {})
        }));

        // Echo: lokale Tracks anlegen, Remote-Tracks darauf zurueckspielen
        let spuren = echo::spuren_hinzufuegen(&pc, &kontext.konfig.stream_id).await?;
        let pc_schwach = Arc::downgrade(&pc);
        let track_kontext = Arc::clone(&kontext);
        let track_kurz = kurz.clone();
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _empfaenger: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                echo::zurueckspielen(
                    track,
                    spuren.clone(),
                    pc_schwach.clone(),
                    track_kontext.konfig.pli_intervall_ms,
                    track_kontext.metriken.clone(),
                    track_kurz.clone(),
                );
                Box::pin(async {})
            },
        ));

        tracing::debug!(sitzung = %kurz, "PeerSitzung erstellt");

        Ok(Self { id, pc, zustand_rx })
    }

    pub fn id(&self) -> SitzungsId {
        self.id
    }

    /// Beobachter fuer den Peer-Verbindungszustand
    pub fn zustand(&self) -> watch::Receiver<RTCPeerConnectionState> {
        self.zustand_rx.clone()
    }

    /// Verarbeitet ein SDP-Offer und liefert das SDP-Answer
    pub async fn angebot_verarbeiten(&self, sdp: String) -> MediaResult<String> {
        let angebot = RTCSessionDescription::offer(sdp)?;
        self.pc.set_remote_description(angebot).await?;

        let antwort = self.pc.create_answer(None).await?;
        let sdp = antwort.sdp.clone();
        self.pc.set_local_description(antwort).await?;

        tracing::debug!(sitzung = %self.id.kurz(), "SDP-Answer erstellt");
        Ok(sdp)
    }

    /// Setzt ein SDP-Answer als Remote-Beschreibung
    pub async fn antwort_verarbeiten(&self, sdp: String) -> MediaResult<()> {
        let antwort = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(antwort).await?;
        Ok(())
    }

    /// Fuegt einen Remote-ICE-Kandidaten hinzu
    pub async fn kandidat_hinzufuegen(
        &self,
        candidate: String,
        sdp_mid: Option<String>,
        sdp_mline_index: Option<u16>,
        username_fragment: Option<String>,
    ) -> MediaResult<()> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate,
                sdp_mid,
                sdp_mline_index,
                username_fragment,
            })
            .await?;
        Ok(())
    }

    /// Schliesst die PeerConnection
    pub async fn schliessen(&self) -> MediaResult<()> {
        self.pc.close().await?;
        tracing::debug!(sitzung = %self.id.kurz(), "PeerSitzung geschlossen");
        Ok(())
    }
}

/// true wenn die Sitzung nicht mehr nutzbar ist
pub fn ist_beendet(zustand: RTCPeerConnectionState) -> bool {
    matches!(
        zustand,
        RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed
    )
}

impl std::fmt::Debug for PeerSitzung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerSitzung")
            .field("id", &self.id)
            .field("zustand", &*self.zustand_rx.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nur_failed_und_closed_beenden() {
        assert!(ist_beendet(RTCPeerConnectionState::Failed));
        assert!(ist_beendet(RTCPeerConnectionState::Closed));
        assert!(!ist_beendet(RTCPeerConnectionState::Disconnected));
        assert!(!ist_beendet(RTCPeerConnectionState::Connected));
        assert!(!ist_beendet(RTCPeerConnectionState::New));
    }
}
