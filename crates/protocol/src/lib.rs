//! rtcrest-protocol – Nachrichtentypen
//!
//! Definiert die JSON-Nachrichten die zwischen Browser und Server
//! ausgetauscht werden:
//! - [`signaling`] – Offer/Answer/ICE-Kandidaten ueber den WebSocket
//! - [`rest`] – REST-Umschlaege ueber den WebRTC-DataChannel

pub mod rest;
pub mod signaling;

pub use rest::{RestAnfrage, RestAntwort, JSON_CONTENT_TYPE};
pub use signaling::SignalNachricht;
