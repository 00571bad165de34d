//! Fehlertypen fuer den Signaling-Service

use rtcrest_core::RtcrestError;
use rtcrest_media::MediaError;
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Nachricht nicht lesbar (JSON, Form)
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] RtcrestError),

    /// WebRTC-Operation fehlgeschlagen
    #[error("Sitzungsfehler: {0}")]
    Sitzung(#[from] MediaError),

    /// Senden ueber den WebSocket fehlgeschlagen
    #[error("Senden fehlgeschlagen: {0}")]
    SendFehler(String),
}

impl SignalingError {
    /// Fatale Fehler beenden die Verbindung
    pub fn ist_fatal(&self) -> bool {
        match self {
            Self::Protokoll(e) => e.ist_fatal(),
            Self::SendFehler(_) => true,
            Self::Sitzung(_) => false,
        }
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kaputtes_json_ist_fatal() {
        let fehler = SignalingError::from(RtcrestError::UngueltigesJson("eof".into()));
        assert!(fehler.ist_fatal());
    }

    #[test]
    fn unbekannte_form_ist_nicht_fatal() {
        let fehler = SignalingError::from(RtcrestError::UngueltigeNachricht("sdp fehlt".into()));
        assert!(!fehler.ist_fatal());
    }
}
