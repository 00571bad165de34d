//! Selbstsignierte Zertifikate fuer HTTPS/WSS
//!
//! Das Zertifikat deckt `localhost`, die Loopback-Adressen und alle
//! IPv4-Adressen der lokalen Netzwerkschnittstellen ab, damit Geraete im
//! LAN den Server per IP ansprechen koennen (nach Bestaetigung der
//! Browser-Warnung).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Utc};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose, SanType,
};

use crate::error::{CryptoError, CryptoResult};

/// Speicherorte von Zertifikat und privatem Schluessel (PEM)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPfade {
    pub zertifikat: PathBuf,
    pub schluessel: PathBuf,
}

impl TlsPfade {
    pub fn neu(zertifikat: impl Into<PathBuf>, schluessel: impl Into<PathBuf>) -> Self {
        Self {
            zertifikat: zertifikat.into(),
            schluessel: schluessel.into(),
        }
    }

    /// Beide Dateien existieren
    pub fn vorhanden(&self) -> bool {
        self.zertifikat.is_file() && self.schluessel.is_file()
    }
}

impl Default for TlsPfade {
    fn default() -> Self {
        Self::neu("server.crt", "server.key")
    }
}

/// Parameter fuer ein neues Zertifikat
#[derive(Debug, Clone)]
pub struct ZertifikatOptionen {
    /// Organisation im Subject
    pub organisation: String,
    /// Gueltigkeit ab heute in Tagen
    pub gueltigkeit_tage: i64,
    /// Zusaetzliche DNS-Namen oder IP-Adressen
    pub zusaetzliche_namen: Vec<String>,
    /// IPv4-Adressen der lokalen Schnittstellen aufnehmen
    pub lokale_adressen: bool,
}

impl Default for ZertifikatOptionen {
    fn default() -> Self {
        Self {
            organisation: "WebRTC PoC".into(),
            gueltigkeit_tage: 365,
            zusaetzliche_namen: vec![],
            lokale_adressen: true,
        }
    }
}

/// Ein erzeugtes Zertifikat samt Schluessel
#[derive(Debug, Clone)]
pub struct SelbstsigniertesZertifikat {
    /// PEM-kodiertes Zertifikat
    pub certificate_pem: String,
    /// PEM-kodierter privater Schluessel (PKCS#8)
    pub private_key_pem: String,
    /// SHA-256 Fingerprint des Zertifikats
    pub certificate_fingerprint: String,
    /// Eingetragene Subject Alternative Names (als Text)
    pub namen: Vec<String>,
}

/// Ergebnis von [`zertifikat_sicherstellen`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZertifikatQuelle {
    /// Vorhandene Dateien werden weiterverwendet
    Wiederverwendet,
    /// Dateien wurden neu geschrieben
    Erzeugt { fingerprint: String },
}

/// Stellt sicher dass Zertifikat und Schluessel auf der Platte liegen.
///
/// Existieren beide Dateien, werden sie unveraendert verwendet. Fehlt eine
/// der beiden, werden beide neu erzeugt und ueberschrieben.
pub fn zertifikat_sicherstellen(
    pfade: &TlsPfade,
    optionen: &ZertifikatOptionen,
) -> CryptoResult<ZertifikatQuelle> {
    if pfade.vorhanden() {
        tracing::info!(
            zertifikat = %pfade.zertifikat.display(),
            schluessel = %pfade.schluessel.display(),
            "Verwende vorhandene Zertifikatsdateien"
        );
        return Ok(ZertifikatQuelle::Wiederverwendet);
    }

    tracing::info!("Erzeuge selbstsigniertes Zertifikat...");
    let zertifikat = generate_self_signed_cert(optionen)?;

    datei_schreiben(&pfade.zertifikat, zertifikat.certificate_pem.as_bytes(), false)?;
    datei_schreiben(&pfade.schluessel, zertifikat.private_key_pem.as_bytes(), true)?;

    tracing::info!(
        zertifikat = %pfade.zertifikat.display(),
        namen = ?zertifikat.namen,
        fingerprint = %zertifikat.certificate_fingerprint,
        "Zertifikat erzeugt"
    );

    Ok(ZertifikatQuelle::Erzeugt {
        fingerprint: zertifikat.certificate_fingerprint,
    })
}

/// Generiert ein selbstsigniertes Server-Zertifikat
pub fn generate_self_signed_cert(
    optionen: &ZertifikatOptionen,
) -> CryptoResult<SelbstsigniertesZertifikat> {
    let mut params = CertificateParams::default();

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(DnType::OrganizationName, optionen.organisation.as_str());
    params.distinguished_name = distinguished_name;

    let jetzt = Utc::now();
    let ende = jetzt + Duration::days(optionen.gueltigkeit_tage);
    params.not_before = rcgen::date_time_ymd(jetzt.year(), jetzt.month() as u8, jetzt.day() as u8);
    params.not_after = rcgen::date_time_ymd(ende.year(), ende.month() as u8, ende.day() as u8);

    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

    let namen = san_namen(optionen);
    params.subject_alt_names = namen
        .iter()
        .map(|name| san_eintrag(name))
        .collect::<CryptoResult<Vec<_>>>()?;

    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;

    Ok(SelbstsigniertesZertifikat {
        certificate_pem: cert.pem(),
        private_key_pem: key_pair.serialize_pem(),
        certificate_fingerprint: compute_certificate_fingerprint(cert.der()),
        namen,
    })
}

/// Berechnet den SHA-256 Fingerprint eines DER-kodierten Zertifikats
pub fn compute_certificate_fingerprint(der_bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(der_bytes);
    hash.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// IPv4-Adressen aller Nicht-Loopback-Schnittstellen
///
/// Fehler beim Auflisten werden geloggt und ergeben eine leere Liste.
pub fn lokale_ipv4_adressen() -> Vec<Ipv4Addr> {
    let mut adressen = Vec::new();
    match if_addrs::get_if_addrs() {
        Ok(schnittstellen) => {
            for iface in schnittstellen {
                if iface.is_loopback() {
                    continue;
                }
                if let IpAddr::V4(v4) = iface.ip() {
                    if !adressen.contains(&v4) {
                        adressen.push(v4);
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(fehler = %e, "Netzwerkschnittstellen nicht lesbar");
        }
    }
    adressen
}

/// Reihenfolge: localhost, Loopback, zusaetzliche Namen, lokale Adressen
fn san_namen(optionen: &ZertifikatOptionen) -> Vec<String> {
    let mut namen = vec![
        "localhost".to_string(),
        Ipv4Addr::LOCALHOST.to_string(),
        Ipv6Addr::LOCALHOST.to_string(),
    ];
    let lokale = if optionen.lokale_adressen {
        lokale_ipv4_adressen()
    } else {
        vec![]
    };
    let kandidaten = optionen
        .zusaetzliche_namen
        .iter()
        .cloned()
        .chain(lokale.iter().map(|ip| ip.to_string()));
    for name in kandidaten {
        if !namen.contains(&name) {
            namen.push(name);
        }
    }
    namen
}

fn san_eintrag(name: &str) -> CryptoResult<SanType> {
    if let Ok(ip) = name.parse::<IpAddr>() {
        return Ok(SanType::IpAddress(ip));
    }
    let dns = name
        .try_into()
        .map_err(|e: rcgen::Error| CryptoError::ZertifikatGenerierung(format!("'{name}': {e}")))?;
    Ok(SanType::DnsName(dns))
}

fn datei_schreiben(pfad: &Path, inhalt: &[u8], privat: bool) -> CryptoResult<()> {
    if let Some(eltern) = pfad.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(eltern).map_err(|e| CryptoError::datei(eltern, e))?;
    }

    let mut optionen = OpenOptions::new();
    optionen.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if privat {
        use std::os::unix::fs::OpenOptionsExt;
        optionen.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = privat;

    let mut datei = optionen.open(pfad).map_err(|e| CryptoError::datei(pfad, e))?;
    datei
        .write_all(inhalt)
        .map_err(|e| CryptoError::datei(pfad, e))?;

    // mode() greift nur beim Anlegen, eine vorhandene Datei behaelt sonst ihre Rechte
    #[cfg(unix)]
    if privat {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(pfad, fs::Permissions::from_mode(0o600))
            .map_err(|e| CryptoError::datei(pfad, e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
