//! Gemeinsame Identifikationstypen
//!
//! Newtype um die Sitzungs-UUID, damit sie in Logs und Metriken nicht mit
//! anderen Strings verwechselt wird.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID einer Signaling-Sitzung (eine WebSocket-Verbindung mit
/// genau einer PeerConnection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SitzungsId(pub Uuid);

impl SitzungsId {
    /// Erstellt eine neue zufaellige SitzungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Kurzform (erste 8 Hex-Zeichen) fuer Log-Ausgaben
    pub fn kurz(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SitzungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SitzungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sitzung:{}", self.0)
    }
}
