//! Fehlertypen fuer WebRTC-Sitzungen

use thiserror::Error;

/// Fehler beim Aufbau oder Betrieb einer PeerSitzung
#[derive(Debug, Error)]
pub enum MediaError {
    /// Fehler aus webrtc-rs (SDP, ICE, DTLS, ...)
    #[error("WebRTC-Fehler: {0}")]
    WebRtc(#[from] webrtc::Error),

    /// Konfiguration ungueltig (z.B. Codec-Registrierung)
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

pub type MediaResult<T> = Result<T, MediaError>;
