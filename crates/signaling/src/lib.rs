//! rtcrest-signaling – WebSocket-Signaling
//!
//! Der Browser tauscht ueber `/ws` SDP und ICE-Kandidaten mit dem Server
//! aus. Jede WebSocket-Verbindung besitzt genau eine `PeerSitzung`.
//!
//! ## Architektur
//!
//! ```text
//! GET /ws (ws_handler)
//!     |  Sitzungslimit -> 503
//!     v
//! SignalVerbindung (pro Verbindung ein Task)
//!     |  select!: WebSocket / Sitzungs-Ausgang / Keepalive / Zustand / Shutdown
//!     v
//! SignalDispatcher
//!     +-- offer          -> answer
//!     +-- answer         -> Remote-Beschreibung
//!     +-- ice-candidate  -> Remote-Kandidat
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod server_state;
pub mod ws;

// Bequeme Re-Exporte
pub use connection::SignalVerbindung;
pub use dispatcher::SignalDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use server_state::{SignalingConfig, SignalingState, SitzungsPlatz};
pub use ws::{signaling_router, ws_handler};
