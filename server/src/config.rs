//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use rtcrest_crypto::TlsPfade;
use rtcrest_media::MediaKonfig;
use rtcrest_observability::logging::{log_format_gueltig, log_level_gueltig};
use rtcrest_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Zertifikat und Schluessel
    pub tls: TlsEinstellungen,
    /// WebRTC-Einstellungen
    pub media: MediaKonfig,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale gleichzeitige WebRTC-Sitzungen
    pub max_sitzungen: usize,
    /// Keepalive-Intervall der Signaling-Verbindungen in Sekunden
    pub keepalive_sek: u64,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "rtcrest".into(),
            max_sitzungen: 100,
            keepalive_sek: 30,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer beide Listener
    pub bind_adresse: String,
    /// Port fuer HTTPS (Demo-Seite, Signaling, API)
    pub https_port: u16,
    /// Port fuer die HTTP-Umleitung auf HTTPS
    pub http_port: u16,
    /// HTTP-Umleitung starten
    pub redirect_aktiviert: bool,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            https_port: 8080,
            http_port: 8081,
            redirect_aktiviert: true,
        }
    }
}

/// TLS-Einstellungen
///
/// Fehlen die Dateien, wird beim Start ein selbstsigniertes Zertifikat
/// erzeugt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsEinstellungen {
    pub zertifikat: String,
    pub schluessel: String,
}

impl Default for TlsEinstellungen {
    fn default() -> Self {
        Self {
            zertifikat: "server.crt".into(),
            schluessel: "server.key".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Herkunft der geladenen Konfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KonfigQuelle {
    Datei,
    /// Datei fehlt, alle Werte sind Standardwerte
    Standardwerte,
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    ///
    /// Geloggt wird hier nichts, das Logging ist beim Laden noch nicht
    /// initialisiert. Der Aufrufer meldet die Quelle und [`Self::pruefen`].
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, KonfigQuelle)> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok((config, KonfigQuelle::Datei))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), KonfigQuelle::Standardwerte))
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte die beim Deserialisieren nicht auffallen
    ///
    /// Ungueltige Logging-Werte sind kein Startfehler, das Logging faellt
    /// dann auf `info` bzw. `text` zurueck.
    pub fn pruefen(&self) -> Vec<String> {
        let mut warnungen = Vec::new();
        if !log_level_gueltig(&self.logging.level) {
            warnungen.push(format!(
                "logging.level '{}' ungueltig, verwende 'info'",
                self.logging.level
            ));
        }
        if !log_format_gueltig(&self.logging.format) {
            warnungen.push(format!(
                "logging.format '{}' ungueltig, verwende 'text'",
                self.logging.format
            ));
        }
        warnungen
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTPS zurueck
    pub fn https_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.https_port)
    }

    /// Gibt die vollstaendige Bind-Adresse fuer die HTTP-Umleitung zurueck
    pub fn http_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.http_port)
    }

    pub fn tls_pfade(&self) -> TlsPfade {
        TlsPfade::neu(&self.tls.zertifikat, &self.tls.schluessel)
    }

    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            max_sitzungen: self.server.max_sitzungen,
            keepalive_sek: self.server.keepalive_sek,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.max_sitzungen, 100);
        assert_eq!(cfg.netzwerk.https_port, 8080);
        assert_eq!(cfg.netzwerk.http_port, 8081);
        assert!(cfg.netzwerk.redirect_aktiviert);
        assert_eq!(cfg.tls.zertifikat, "server.crt");
        assert_eq!(cfg.media.ice_server.len(), 4);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn bind_adressen() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.https_bind_adresse(), "0.0.0.0:8080");
        assert_eq!(cfg.http_bind_adresse(), "0.0.0.0:8081");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Testserver"
            max_sitzungen = 5

            [netzwerk]
            https_port = 9443
            redirect_aktiviert = false

            [media]
            ice_server = ["stun:stun.example.org:3478"]
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.name, "Testserver");
        assert_eq!(cfg.signaling_config().max_sitzungen, 5);
        assert_eq!(cfg.netzwerk.https_port, 9443);
        assert!(!cfg.netzwerk.redirect_aktiviert);
        assert_eq!(cfg.media.ice_server, vec!["stun:stun.example.org:3478"]);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.http_port, 8081);
        assert_eq!(cfg.media.pli_intervall_ms, 3000);
        assert_eq!(cfg.server.keepalive_sek, 30);
    }

    #[test]
    fn fehlende_datei_liefert_standard() {
        let (cfg, quelle) = ServerConfig::laden("/nicht/vorhanden/config.toml").unwrap();
        assert_eq!(quelle, KonfigQuelle::Standardwerte);
        assert_eq!(cfg.netzwerk.https_port, 8080);
    }

    #[test]
    fn vorhandene_datei_wird_gelesen() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("config.toml");
        std::fs::write(&pfad, "[netzwerk]\nhttps_port = 9443\n").unwrap();
        let (cfg, quelle) = ServerConfig::laden(pfad.to_str().unwrap()).unwrap();
        assert_eq!(quelle, KonfigQuelle::Datei);
        assert_eq!(cfg.netzwerk.https_port, 9443);
    }

    #[test]
    fn standard_logging_ohne_warnungen() {
        assert!(ServerConfig::default().pruefen().is_empty());

        let mut cfg = ServerConfig::default();
        cfg.logging.level = "info,webrtc=debug".into();
        assert!(cfg.pruefen().is_empty());
    }

    #[test]
    fn ungueltiges_logging_wird_gemeldet() {
        let toml = r#"
            [logging]
            level = "laut"
            format = "xml"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        let warnungen = cfg.pruefen();
        assert_eq!(warnungen.len(), 2);
        assert!(warnungen[0].contains("logging.level 'laut'"));
        assert!(warnungen[1].contains("logging.format 'xml'"));
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("config.toml");
        std::fs::write(&pfad, "[netzwerk\nhttps_port = ").unwrap();
        let fehler = ServerConfig::laden(pfad.to_str().unwrap()).unwrap_err();
        assert!(fehler.to_string().contains("Konfigurationsfehler"));
    }
}
