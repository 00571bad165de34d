//! WebRTC-API-Aufbau
//!
//! Registriert genau die Codecs die der Echo-Server zurueckspielen kann
//! (VP8 fuer Video, Opus fuer Audio) und die Standard-Interceptoren von
//! webrtc-rs (NACK, RTCP-Reports, TWCC).

use std::sync::Arc;

use rtcrest_api::RestDispatcher;
use rtcrest_core::SitzungsId;
use rtcrest_observability::RtcMetriken;
use rtcrest_protocol::SignalNachricht;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MediaEngine, MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::api::{APIBuilder, API};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::rtp_transceiver::rtp_codec::{
    RTCRtpCodecCapability, RTCRtpCodecParameters, RTPCodecType,
};

use crate::error::{MediaError, MediaResult};
use crate::sitzung::PeerSitzung;

/// Payload-Type fuer VP8
pub const PAYLOAD_TYPE_VP8: u8 = 96;
/// Payload-Type fuer Opus
pub const PAYLOAD_TYPE_OPUS: u8 = 111;

/// Oeffentliche STUN-Server (Standard)
pub const STANDARD_ICE_SERVER: [&str; 4] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
    "stun:stun.cloudflare.com:3478",
];

/// Medien-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaKonfig {
    /// STUN/TURN-URLs fuer die PeerConnection
    pub ice_server: Vec<String>,
    /// Abstand der Picture-Loss-Indications fuer Video-Tracks in ms (0 = aus)
    pub pli_intervall_ms: u64,
    /// Stream-ID der lokalen Echo-Tracks
    pub stream_id: String,
}

impl Default for MediaKonfig {
    fn default() -> Self {
        Self {
            ice_server: STANDARD_ICE_SERVER.iter().map(|s| s.to_string()).collect(),
            pli_intervall_ms: 3000,
            stream_id: "rtcrest".into(),
        }
    }
}

impl MediaKonfig {
    /// RTCConfiguration fuer eine neue PeerConnection
    pub fn rtc_konfiguration(&self) -> RTCConfiguration {
        let ice_servers = if self.ice_server.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.ice_server.clone(),
                ..Default::default()
            }]
        };
        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

/// Gemeinsame Bausteine aller Sitzungen
pub(crate) struct SitzungsKontext {
    pub konfig: MediaKonfig,
    pub dispatcher: RestDispatcher,
    pub metriken: RtcMetriken,
}

/// Fabrik fuer PeerSitzungen
///
/// Haelt die webrtc-rs-API (MediaEngine + Interceptoren) und teilt sie
/// zwischen allen Sitzungen.
pub struct RtcApi {
    api: API,
    kontext: Arc<SitzungsKontext>,
}

impl RtcApi {
    /// Baut die API mit VP8/Opus und den Standard-Interceptoren
    pub fn neu(
        konfig: MediaKonfig,
        dispatcher: RestDispatcher,
        metriken: RtcMetriken,
    ) -> MediaResult<Self> {
        let mut media_engine = MediaEngine::default();
        codecs_registrieren(&mut media_engine)?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        tracing::debug!(
            ice_server = ?konfig.ice_server,
            pli_intervall_ms = konfig.pli_intervall_ms,
            "WebRTC-API initialisiert"
        );

        Ok(Self {
            api,
            kontext: Arc::new(SitzungsKontext {
                konfig,
                dispatcher,
                metriken,
            }),
        })
    }

    /// Aktive Medien-Konfiguration
    pub fn konfig(&self) -> &MediaKonfig {
        &self.kontext.konfig
    }

    /// Erstellt eine neue PeerSitzung
    ///
    /// Ausgehende Signaling-Nachrichten (lokale ICE-Kandidaten) landen in
    /// `ausgang`.
    pub async fn sitzung_erstellen(
        &self,
        id: SitzungsId,
        ausgang: mpsc::Sender<SignalNachricht>,
    ) -> MediaResult<PeerSitzung> {
        let pc = self
            .api
            .new_peer_connection(self.kontext.konfig.rtc_konfiguration())
            .await?;
        PeerSitzung::aufbauen(id, Arc::new(pc), Arc::clone(&self.kontext), ausgang).await
    }
}

impl std::fmt::Debug for RtcApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtcApi")
            .field("konfig", &self.kontext.konfig)
            .finish_non_exhaustive()
    }
}

fn codecs_registrieren(media_engine: &mut MediaEngine) -> MediaResult<()> {
    media_engine
        .register_codec(
            RTCRtpCodecParameters {
                capability: RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    rtcp_feedback: vec![],
                },
                payload_type: PAYLOAD_TYPE_VP8,
                ..Default::default()
            },
            RTPCodecType::Video,
        )
        .map_err(|e| MediaError::Konfiguration(format!("VP8: {e}")))?;

    media_engine
        .register_codec(
            RTCRtpCodecParameters {
                capability: RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    rtcp_feedback: vec![],
                },
                payload_type: PAYLOAD_TYPE_OPUS,
                ..Default::default()
            },
            RTPCodecType::Audio,
        )
        .map_err(|e| MediaError::Konfiguration(format!("Opus: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_konfig_hat_vier_stun_server() {
        let konfig = MediaKonfig::default();
        assert_eq!(konfig.ice_server.len(), 4);
        assert!(konfig.ice_server.iter().all(|u| u.starts_with("stun:")));
        assert_eq!(konfig.pli_intervall_ms, 3000);

        let rtc = konfig.rtc_konfiguration();
        assert_eq!(rtc.ice_servers.len(), 1);
        assert_eq!(rtc.ice_servers[0].urls.len(), 4);
    }

    #[test]
    fn leere_ice_liste_ergibt_keine_server() {
        let konfig = MediaKonfig {
            ice_server: vec![],
            ..Default::default()
        };
        assert!(konfig.rtc_konfiguration().ice_servers.is_empty());
    }

    #[test]
    fn codecs_lassen_sich_registrieren() {
        let mut media_engine = MediaEngine::default();
        codecs_registrieren(&mut media_engine).unwrap();
    }
}
