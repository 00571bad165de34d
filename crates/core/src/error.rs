//! Fehlertypen fuer rtcrest
//!
//! Zentraler Fehler-Enum fuer crate-uebergreifende Fehlerzustaende.
//! Untermodule definieren eigene Fehler und konvertieren bei Bedarf.

use thiserror::Error;

/// Globaler Result-Alias fuer rtcrest
pub type Result<T> = std::result::Result<T, RtcrestError>;

/// Crate-uebergreifende Fehler
#[derive(Debug, Error)]
pub enum RtcrestError {
    // --- Protokoll ---
    /// Text ist kein gueltiges JSON
    #[error("Ungueltiges JSON: {0}")]
    UngueltigesJson(String),

    /// Gueltiges JSON, aber falsche Struktur
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl RtcrestError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn die Gegenseite kein JSON spricht und die
    /// Verbindung deshalb beendet werden sollte
    pub fn ist_fatal(&self) -> bool {
        matches!(self, Self::UngueltigesJson(_))
    }
}

impl From<serde_json::Error> for RtcrestError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Syntax | Category::Eof | Category::Io => Self::UngueltigesJson(e.to_string()),
            Category::Data => Self::UngueltigeNachricht(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = RtcrestError::intern("Puffer voll");
        assert_eq!(e.to_string(), "Interner Fehler: Puffer voll");
    }

    #[test]
    fn syntaxfehler_ist_fatal() {
        let e: RtcrestError = serde_json::from_str::<serde_json::Value>("{kein json")
            .unwrap_err()
            .into();
        assert!(matches!(e, RtcrestError::UngueltigesJson(_)));
        assert!(e.ist_fatal());
    }

    #[test]
    fn datenfehler_ist_nicht_fatal() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Ziel {
            feld: u32,
        }
        let e: RtcrestError = serde_json::from_str::<Ziel>(r#"{"feld":"text"}"#)
            .unwrap_err()
            .into();
        assert!(matches!(e, RtcrestError::UngueltigeNachricht(_)));
        assert!(!e.ist_fatal());
    }
}
