//! Medien-Echo
//!
//! Jeder Remote-Track wird Paket fuer Paket auf den lokalen Track gleicher
//! Art geschrieben. `TrackLocalStaticRTP` setzt SSRC und Payload-Type der
//! ausgehenden Bindung selbst.

use std::sync::{Arc, Weak};
use std::time::Duration;

use rtcrest_observability::RtcMetriken;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtcp::payload_feedbacks::picture_loss_indication::PictureLossIndication;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::track_local_static_rtp::TrackLocalStaticRTP;
use webrtc::track::track_local::{TrackLocal, TrackLocalWriter};
use webrtc::track::track_remote::TrackRemote;

use crate::error::MediaResult;

/// Jedes n-te Video-Paket wird im Debug-Log protokolliert
const VIDEO_LOG_INTERVALL: u64 = 100;

/// Lokale Ziel-Tracks einer Sitzung
#[derive(Clone)]
pub struct EchoSpuren {
    pub video: Arc<TrackLocalStaticRTP>,
    pub audio: Arc<TrackLocalStaticRTP>,
}

impl EchoSpuren {
    /// Ziel-Track fuer eine Track-Art
    pub fn fuer(&self, art: RTPCodecType) -> Option<Arc<TrackLocalStaticRTP>> {
        match art {
            RTPCodecType::Video => Some(Arc::clone(&self.video)),
            RTPCodecType::Audio => Some(Arc::clone(&self.audio)),
            _ => None,
        }
    }
}

/// Legt den VP8- und den Opus-Track an und haengt sie an die PeerConnection
pub async fn spuren_hinzufuegen(
    pc: &RTCPeerConnection,
    stream_id: &str,
) -> MediaResult<EchoSpuren> {
    let video = Arc::new(TrackLocalStaticRTP::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            ..Default::default()
        },
        "video".to_owned(),
        stream_id.to_owned(),
    ));
    let audio = Arc::new(TrackLocalStaticRTP::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            ..Default::default()
        },
        "audio".to_owned(),
        stream_id.to_owned(),
    ));

    let video_sender = pc
        .add_track(Arc::clone(&video) as Arc<dyn TrackLocal + Send + Sync>)
        .await?;
    rtcp_leeren(video_sender);

    let audio_sender = pc
        .add_track(Arc::clone(&audio) as Arc<dyn TrackLocal + Send + Sync>)
        .await?;
    rtcp_leeren(audio_sender);

    Ok(EchoSpuren { video, audio })
}

/// RTCP vom Sender lesen, sonst laufen die Interceptoren nicht
fn rtcp_leeren(sender: Arc<RTCRtpSender>) {
    tokio::spawn(async move {
        let mut puffer = vec![0u8; 1500];
        while sender.read(&mut puffer).await.is_ok() {}
    });
}

fn art_name(art: RTPCodecType) -> &'static str {
    match art {
        RTPCodecType::Video => "video",
        RTPCodecType::Audio => "audio",
        _ => "unbekannt",
    }
}

/// Startet die Echo-Schleife fuer einen Remote-Track
pub fn zurueckspielen(
    track: Arc<TrackRemote>,
    spuren: EchoSpuren,
    pc: Weak<RTCPeerConnection>,
    pli_intervall_ms: u64,
    metriken: RtcMetriken,
    sitzung: String,
) {
    let art = track.kind();
    let Some(ziel) = spuren.fuer(art) else {
        tracing::warn!(sitzung = %sitzung, "Track unbekannter Art ignoriert");
        return;
    };
    let name = art_name(art);
    let ssrc = track.ssrc();

    tracing::info!(sitzung = %sitzung, art = name, ssrc, "Remote-Track empfangen");

    let pc_echo = pc.clone();
    let pli = if art == RTPCodecType::Video && pli_intervall_ms > 0 {
        Some(tokio::spawn(pli_schleife(
            pc,
            ssrc,
            Duration::from_millis(pli_intervall_ms),
        )))
    } else {
        None
    };

    tokio::spawn(async move {
        let mut pakete: u64 = 0;

        loop {
            let (paket, _) = match track.read_rtp().await {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(sitzung = %sitzung, art = name, fehler = %e, "Remote-Track beendet");
                    break;
                }
            };

            if let Err(e) = ziel.write_rtp(&paket).await {
                if ist_geschlossen(&e) || verbindung_beendet(&pc_echo) {
                    tracing::debug!(sitzung = %sitzung, art = name, fehler = %e, "Lokaler Track geschlossen");
                    break;
                }
                tracing::warn!(sitzung = %sitzung, art = name, fehler = %e, "RTP-Paket nicht zurueckgesendet");
                continue;
            }

            pakete += 1;
            metriken.rtp_zurueckgesendet(name);

            if art == RTPCodecType::Video && pakete % VIDEO_LOG_INTERVALL == 0 {
                tracing::debug!(
                    sitzung = %sitzung,
                    pakete,
                    seq = paket.header.sequence_number,
                    bytes = paket.payload.len(),
                    "Video-Pakete zurueckgesendet"
                );
            }
        }

        if let Some(pli) = pli {
            pli.abort();
        }
        tracing::info!(sitzung = %sitzung, art = name, pakete, "Echo beendet");
    });
}

/// true wenn ein Schreibfehler eine geschlossene Leitung meldet
///
/// `TrackLocalStaticRTP` sammelt die Fehler aller Bindungen und liefert sie
/// als zusammengefassten Text, nicht als `ErrClosedPipe`-Variante.
fn ist_geschlossen(fehler: &webrtc::Error) -> bool {
    matches!(fehler, webrtc::Error::ErrClosedPipe)
        || fehler
            .to_string()
            .lines()
            .any(|zeile| zeile.contains(&webrtc::Error::ErrClosedPipe.to_string()))
}

/// true wenn die PeerConnection weg oder geschlossen ist
fn verbindung_beendet(pc: &Weak<RTCPeerConnection>) -> bool {
    match pc.upgrade() {
        Some(pc) => crate::sitzung::ist_beendet(pc.connection_state()),
        None => true,
    }
}

/// Fordert regelmaessig Keyframes vom Browser an
async fn pli_schleife(pc: Weak<RTCPeerConnection>, media_ssrc: u32, intervall: Duration) {
    let mut takt = tokio::time::interval(intervall);
    loop {
        takt.tick().await;
        let Some(pc) = pc.upgrade() else {
            break;
        };
        if pc
            .write_rtcp(&[Box::new(PictureLossIndication {
                sender_ssrc: 0,
                media_ssrc,
            })])
            .await
            .is_err()
        {
            break;
        }
    }
}
