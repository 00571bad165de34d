//! REST-Umschlaege fuer den DataChannel
//!
//! Der Browser schickt Anfragen als JSON-Text ueber einen geordneten,
//! zuverlaessigen DataChannel; der Server antwortet in derselben Reihenfolge.
//!
//! ```text
//! -> {"method":"GET","endpoint":"/api/users","headers":{},"body":null}
//! <- {"status":200,"headers":{"Content-Type":"application/json"},"body":[...]}
//! ```
//!
//! Optional kann der Client ein `id`-Feld mitschicken; es wird unveraendert
//! in die Antwort kopiert.

use std::collections::BTreeMap;

use rtcrest_core::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Content-Type aller Antworten der emulierten API
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Begruessungstext der beim Oeffnen des DataChannels gesendet wird
pub const WILLKOMMENS_TEXT: &str = "WebRTC REST API Server Ready";

/// Anfrage-Umschlag (Browser -> Server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestAnfrage {
    /// HTTP-Methode, z.B. "GET" (fehlend = leer)
    #[serde(default, deserialize_with = "null_als_standard")]
    pub method: String,
    /// Pfad inklusive optionalem Query-String, z.B. "/api/users" (fehlend = leer)
    #[serde(default, deserialize_with = "null_als_standard")]
    pub endpoint: String,
    /// Header als einfache String-Map
    #[serde(default, deserialize_with = "null_als_standard")]
    pub headers: BTreeMap<String, String>,
    /// Beliebiger JSON-Body (fehlend = `null`)
    #[serde(default)]
    pub body: Value,
    /// Optionale Korrelations-ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RestAnfrage {
    /// Erstellt eine Anfrage ohne Header und Body
    pub fn neu(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
            body: Value::Null,
            id: None,
        }
    }

    /// Setzt den JSON-Body
    pub fn mit_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Normalisierte Methode (Grossbuchstaben)
    pub fn methode(&self) -> String {
        self.method.trim().to_ascii_uppercase()
    }

    /// Deserialisiert eine Anfrage aus DataChannel-Bytes
    pub fn aus_bytes(daten: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(daten)?)
    }
}

/// Antwort-Umschlag (Server -> Browser)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestAntwort {
    /// HTTP-Statuscode
    pub status: u16,
    /// Antwort-Header
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON-Body
    #[serde(default)]
    pub body: Value,
    /// Kopie der `id` aus der Anfrage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RestAntwort {
    /// Erstellt eine JSON-Antwort mit `Content-Type: application/json`
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status,
            headers,
            body,
            id: None,
        }
    }

    /// Fehlerantwort `{"error": <nachricht>}`
    pub fn fehler(status: u16, nachricht: impl Into<String>) -> Self {
        Self::json(status, serde_json::json!({ "error": nachricht.into() }))
    }

    /// Begruessung beim Oeffnen des DataChannels
    pub fn willkommen() -> Self {
        Self::json(200, serde_json::json!({ "message": WILLKOMMENS_TEXT }))
    }

    /// Uebernimmt die Korrelations-ID einer Anfrage
    pub fn mit_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }

    /// Serialisiert die Antwort als JSON-Bytes
    pub fn zu_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Behandelt `null` wie ein fehlendes Feld
fn null_als_standard<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimale_anfrage() {
        let anfrage =
            RestAnfrage::aus_bytes(br#"{"method":"get","endpoint":"/api/health"}"#).unwrap();
        assert_eq!(anfrage.methode(), "GET");
        assert_eq!(anfrage.endpoint, "/api/health");
        assert!(anfrage.headers.is_empty());
        assert_eq!(anfrage.body, Value::Null);
        assert!(anfrage.id.is_none());
    }

    #[test]
    fn header_null_wird_leere_map() {
        let anfrage = RestAnfrage::aus_bytes(
            br#"{"method":"POST","endpoint":"/api/users","headers":null,"body":{"name":"Max"}}"#,
        )
        .unwrap();
        assert!(anfrage.headers.is_empty());
        assert_eq!(anfrage.body["name"], "Max");
    }

    #[test]
    fn fehlende_felder_werden_leer() {
        let ohne_methode = RestAnfrage::aus_bytes(br#"{"endpoint":"/api/health"}"#).unwrap();
        assert_eq!(ohne_methode.methode(), "");
        assert_eq!(ohne_methode.endpoint, "/api/health");

        let ohne_endpoint = RestAnfrage::aus_bytes(br#"{"method":"GET"}"#).unwrap();
        assert_eq!(ohne_endpoint.methode(), "GET");
        assert_eq!(ohne_endpoint.endpoint, "");

        let leer = RestAnfrage::aus_bytes(br#"{"method":null,"endpoint":null}"#).unwrap();
        assert_eq!(leer, RestAnfrage::neu("", ""));
    }

    #[test]
    fn falsche_feldtypen_und_kein_json() {
        let e = RestAnfrage::aus_bytes(br#"{"method":42,"endpoint":"/api/users"}"#).unwrap_err();
        assert!(!e.ist_fatal());
        assert!(RestAnfrage::aus_bytes(b"GET /api/users").unwrap_err().ist_fatal());
    }

    #[test]
    fn willkommen_form() {
        let wert: Value =
            serde_json::from_slice(&RestAntwort::willkommen().zu_bytes().unwrap()).unwrap();
        assert_eq!(
            wert,
            json!({
                "status": 200,
                "headers": {"Content-Type": "application/json"},
                "body": {"message": "WebRTC REST API Server Ready"}
            })
        );
    }

    #[test]
    fn id_wird_nur_bei_bedarf_serialisiert() {
        let ohne: Value =
            serde_json::from_slice(&RestAntwort::fehler(404, "x").zu_bytes().unwrap()).unwrap();
        assert!(ohne.get("id").is_none());

        let mit: Value = serde_json::from_slice(
            &RestAntwort::fehler(404, "x")
                .mit_id(Some(json!(7)))
                .zu_bytes()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(mit["id"], 7);
        assert_eq!(mit["body"]["error"], "x");
    }
}
