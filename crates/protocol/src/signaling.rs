//! Signaling-Protokoll (WebSocket)
//!
//! Jede Nachricht ist ein JSON-Objekt mit einem `type`-Diskriminator:
//!
//! ```text
//! {"type":"offer","sdp":"v=0..."}
//! {"type":"answer","sdp":"v=0..."}
//! {"type":"ice-candidate","candidate":"candidate:...","sdpMid":"0","sdpMLineIndex":0}
//! ```
//!
//! Die Feldnamen der Kandidaten folgen `RTCIceCandidateInit` aus dem Browser.

use rtcrest_core::{Result, RtcrestError};
use serde::{Deserialize, Serialize};

/// Alle Signaling-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalNachricht {
    /// SDP-Angebot (vom Browser)
    Offer { sdp: String },

    /// SDP-Antwort (vom Server, oder vom Browser bei Neuverhandlung)
    Answer { sdp: String },

    /// Trickle-ICE-Kandidat (beide Richtungen)
    IceCandidate {
        candidate: String,
        #[serde(rename = "sdpMid")]
        sdp_mid: Option<String>,
        #[serde(rename = "sdpMLineIndex")]
        sdp_mline_index: Option<u16>,
        #[serde(
            rename = "usernameFragment",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        username_fragment: Option<String>,
    },

    /// Unbekannter `type` – wird vom Relay ignoriert
    #[serde(other)]
    Unbekannt,
}

impl SignalNachricht {
    /// Erstellt eine Answer-Nachricht
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::Answer { sdp: sdp.into() }
    }

    /// Kurzname des Nachrichtentyps fuer Logs und Metrik-Labels
    pub fn typ(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::Unbekannt => "unbekannt",
        }
    }

    /// Serialisiert die Nachricht als JSON
    pub fn zu_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RtcrestError::intern(e.to_string()))
    }

    /// Deserialisiert eine Nachricht aus JSON
    ///
    /// Kein JSON: [`RtcrestError::UngueltigesJson`]. JSON mit falscher
    /// Struktur (z.B. `offer` ohne `sdp`): [`RtcrestError::UngueltigeNachricht`].
    pub fn aus_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_parsen() {
        let msg = SignalNachricht::aus_json(r#"{"type":"offer","sdp":"v=0\r\n"}"#).unwrap();
        assert_eq!(
            msg,
            SignalNachricht::Offer {
                sdp: "v=0\r\n".into()
            }
        );
        assert_eq!(msg.typ(), "offer");
    }

    #[test]
    fn answer_serialisierung() {
        let json = SignalNachricht::answer("v=0").zu_json().unwrap();
        let wert: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(wert["type"], "answer");
        assert_eq!(wert["sdp"], "v=0");
    }

    #[test]
    fn kandidat_mit_browser_feldnamen() {
        let json = r#"{
            "type": "ice-candidate",
            "candidate": "candidate:1 1 udp 2122260223 192.168.1.2 54321 typ host",
            "sdpMid": "0",
            "sdpMLineIndex": 0,
            "usernameFragment": "abcd"
        }"#;
        match SignalNachricht::aus_json(json).unwrap() {
            SignalNachricht::IceCandidate {
                candidate,
                sdp_mid,
                sdp_mline_index,
                username_fragment,
            } => {
                assert!(candidate.starts_with("candidate:1"));
                assert_eq!(sdp_mid.as_deref(), Some("0"));
                assert_eq!(sdp_mline_index, Some(0));
                assert_eq!(username_fragment.as_deref(), Some("abcd"));
            }
            andere => panic!("Erwartet IceCandidate, erhalten {andere:?}"),
        }
    }

    #[test]
    fn kandidat_ohne_optionale_felder() {
        let msg =
            SignalNachricht::aus_json(r#"{"type":"ice-candidate","candidate":"candidate:x"}"#)
                .unwrap();
        assert_eq!(
            msg,
            SignalNachricht::IceCandidate {
                candidate: "candidate:x".into(),
                sdp_mid: None,
                sdp_mline_index: None,
                username_fragment: None,
            }
        );
    }

    #[test]
    fn ausgehender_kandidat_hat_null_felder_statt_fehlender() {
        let msg = SignalNachricht::IceCandidate {
            candidate: "candidate:x".into(),
            sdp_mid: None,
            sdp_mline_index: None,
            username_fragment: None,
        };
        let wert: serde_json::Value = serde_json::from_str(&msg.zu_json().unwrap()).unwrap();
        assert_eq!(wert["type"], "ice-candidate");
        assert!(wert["sdpMid"].is_null());
        assert!(wert["sdpMLineIndex"].is_null());
        assert!(wert.get("usernameFragment").is_none());
    }

    #[test]
    fn unbekannter_typ_wird_toleriert() {
        let msg = SignalNachricht::aus_json(r#"{"type":"bye"}"#).unwrap();
        assert_eq!(msg, SignalNachricht::Unbekannt);
    }

    #[test]
    fn kein_json_ist_fatal() {
        let e = SignalNachricht::aus_json("hallo").unwrap_err();
        assert!(e.ist_fatal());
    }

    #[test]
    fn offer_ohne_sdp_ist_nicht_fatal() {
        let e = SignalNachricht::aus_json(r#"{"type":"offer"}"#).unwrap_err();
        assert!(matches!(e, RtcrestError::UngueltigeNachricht(_)));
        assert!(!e.ist_fatal());
    }
}
