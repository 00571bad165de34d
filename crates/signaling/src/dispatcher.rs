//! SignalDispatcher – Leitet Signaling-Nachrichten an die PeerSitzung
//!
//! Jede eingehende Nachricht wird hier verarbeitet. Nur ein `offer`
//! erzeugt eine direkte Antwort an den Browser.

use rtcrest_media::PeerSitzung;
use rtcrest_observability::RtcMetriken;
use rtcrest_protocol::SignalNachricht;

use crate::error::SignalingResult;

/// Verarbeitet Signaling-Nachrichten einer Verbindung
pub struct SignalDispatcher<'a> {
    sitzung: &'a PeerSitzung,
    metriken: &'a RtcMetriken,
}

impl<'a> SignalDispatcher<'a> {
    pub fn neu(sitzung: &'a PeerSitzung, metriken: &'a RtcMetriken) -> Self {
        Self { sitzung, metriken }
    }

    /// Parst einen Text-Frame und verarbeitet ihn
    pub async fn text_verarbeiten(&self, text: &str) -> SignalingResult<Option<SignalNachricht>> {
        let nachricht = SignalNachricht::aus_json(text)?;
        self.dispatch(nachricht).await
    }

    /// Verarbeitet eine Nachricht, gibt ggf. die Antwort an den Browser zurueck
    pub async fn dispatch(
        &self,
        nachricht: SignalNachricht,
    ) -> SignalingResult<Option<SignalNachricht>> {
        let sitzung = self.sitzung.id().kurz();
        self.metriken.signal_empfangen(nachricht.typ());

        match nachricht {
            SignalNachricht::Offer { sdp } => {
                tracing::info!(sitzung = %sitzung, "Offer empfangen");
                let antwort = self.sitzung.angebot_verarbeiten(sdp).await?;
                Ok(Some(SignalNachricht::answer(antwort)))
            }
            SignalNachricht::Answer { sdp } => {
                tracing::info!(sitzung = %sitzung, "Answer empfangen");
                self.sitzung.antwort_verarbeiten(sdp).await?;
                Ok(None)
            }
            SignalNachricht::IceCandidate {
                candidate,
                sdp_mid,
                sdp_mline_index,
                username_fragment,
            } => {
                tracing::debug!(sitzung = %sitzung, kandidat = %candidate, "ICE-Kandidat empfangen");
                self.sitzung
                    .kandidat_hinzufuegen(candidate, sdp_mid, sdp_mline_index, username_fragment)
                    .await?;
                Ok(None)
            }
            SignalNachricht::Unbekannt => {
                tracing::debug!(sitzung = %sitzung, "Unbekannter Nachrichtentyp ignoriert");
                Ok(None)
            }
        }
    }
}
