//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (ueberschreibt die Konfigurationsdatei):
//! - `RTCREST_LOG_LEVEL`: Filter-Ausdruck (z.B. `debug` oder `info,webrtc=warn`)
//! - `RTCREST_LOG_FORMAT`: Format (text/json)
//!
//! webrtc-rs loggt sehr gespraechig auf `info`; ohne expliziten Filter
//! werden dessen Targets auf `warn` begrenzt.

use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Filter
pub const LOG_LEVEL_ENV: &str = "RTCREST_LOG_LEVEL";
/// Umgebungsvariable fuer das Log-Format
pub const LOG_FORMAT_ENV: &str = "RTCREST_LOG_FORMAT";

/// Filter-Zusatz fuer die Targets der WebRTC-Bibliothek
const WEBRTC_FILTER: &str = "webrtc=warn,webrtc_ice=warn,webrtc_sctp=warn,webrtc_dtls=warn,webrtc_srtp=warn,webrtc_mdns=warn";

/// Initialisiert das Logging-System.
///
/// Liest `RTCREST_LOG_LEVEL` und `RTCREST_LOG_FORMAT` aus der Umgebung.
/// Faellt auf die uebergebenen Werte zurueck, dann auf `info` / `text`.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_new(standard_filter(level)))
        .unwrap_or_else(|_| EnvFilter::new(standard_filter("info")));

    let format_env = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| format.to_string());

    match format_env.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Baut den Standard-Filter aus einem einfachen Level
///
/// Enthaelt der Wert bereits Direktiven (`target=level`), wird er
/// unveraendert uebernommen.
pub fn standard_filter(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{WEBRTC_FILTER}")
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
///
/// Erlaubt ein einfaches Level oder eine Filter-Liste mit Direktiven
/// (`info,webrtc=debug`).
pub fn log_level_gueltig(level: &str) -> bool {
    if level.contains('=') || level.contains(',') {
        return EnvFilter::try_new(level).is_ok();
    }
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_gueltige_werte() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(log_level_gueltig(level), "{level}");
        }
    }

    #[test]
    fn log_level_ungueltige_werte() {
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO")); // Gross-/Kleinschreibung
        assert!(!log_level_gueltig(""));
    }

    #[test]
    fn log_level_mit_direktiven() {
        assert!(log_level_gueltig("info,webrtc=debug"));
        assert!(log_level_gueltig("rtcrest_media=trace"));
        assert!(!log_level_gueltig("info,webrtc=laut"));
    }

    #[test]
    fn log_format_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
    }

    #[test]
    fn standard_filter_daempft_webrtc() {
        let filter = standard_filter("debug");
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("webrtc_ice=warn"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    fn standard_filter_behaelt_direktiven() {
        assert_eq!(standard_filter("info,webrtc=debug"), "info,webrtc=debug");
    }
}
