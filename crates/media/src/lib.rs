//! rtcrest-media – WebRTC-Sitzungen
//!
//! Die eigentliche Transportarbeit (ICE, DTLS, SRTP, SCTP, RTP/RTCP)
//! uebernimmt webrtc-rs. Dieses Crate verdrahtet nur:
//!
//! ```text
//! RtcApi (MediaEngine: VP8 + Opus, Standard-Interceptoren)
//!     |
//!     v
//! PeerSitzung (eine RTCPeerConnection pro Signaling-Verbindung)
//!     +-- ICE-Kandidaten        -> Signaling-Ausgang (mpsc)
//!     +-- DataChannel "rest-api" -> RestDispatcher -> Antwort auf demselben Kanal
//!     +-- Remote-Tracks          -> Echo auf lokale Tracks (+ PLI fuer Video)
//! ```
//!
//! ## Module
//! - [`engine`] – API-Aufbau und Konfiguration
//! - [`sitzung`] – PeerSitzung (Offer/Answer, Kandidaten, Zustand)
//! - [`datenkanal`] – REST ueber DataChannel
//! - [`echo`] – lokale Tracks und Echo-Schleifen

pub mod datenkanal;
pub mod echo;
pub mod engine;
pub mod error;
pub mod sitzung;

pub use engine::{MediaKonfig, RtcApi, STANDARD_ICE_SERVER};
pub use error::{MediaError, MediaResult};
pub use sitzung::PeerSitzung;

pub use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
