//! TLS-Acceptor fuer den HTTPS/WSS-Server
//!
//! Liest Zertifikat und Schluessel aus den PEM-Dateien und baut daraus
//! einen `tokio_rustls::TlsAcceptor`. Der Acceptor wird im manuellen
//! Accept-Loop des Servers pro Verbindung benutzt.

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use rustls_pemfile::{certs, private_key};
use tokio_rustls::TlsAcceptor;

use crate::error::{CryptoError, CryptoResult};
use crate::zertifikat::{compute_certificate_fingerprint, TlsPfade};

/// Installiert `ring` als prozessweiten rustls-Crypto-Provider.
///
/// Mehrfache Aufrufe sind harmlos.
pub fn crypto_provider_installieren() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// TLS-Server-Seite (Acceptor + Fingerprint des Leaf-Zertifikats)
#[derive(Clone)]
pub struct TlsServer {
    pub acceptor: TlsAcceptor,
    pub certificate_fingerprint: String,
}

impl TlsServer {
    /// Erstellt den Acceptor aus PEM-Texten
    pub fn aus_pem(certificate_pem: &str, private_key_pem: &str) -> CryptoResult<Self> {
        crypto_provider_installieren();

        let cert_chain = parse_certificates(certificate_pem)?;
        let private_key = parse_private_key(private_key_pem)?;
        let certificate_fingerprint = compute_certificate_fingerprint(&cert_chain[0]);

        let mut tls_config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)
            .map_err(|e| CryptoError::Tls(e.to_string()))?;
        // WebSocket-Upgrades nur ueber HTTP/1.1
        tls_config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(Self {
            acceptor: TlsAcceptor::from(Arc::new(tls_config)),
            certificate_fingerprint,
        })
    }

    /// Erstellt den Acceptor aus den PEM-Dateien
    pub fn aus_dateien(pfade: &TlsPfade) -> CryptoResult<Self> {
        let certificate_pem = std::fs::read_to_string(&pfade.zertifikat)
            .map_err(|e| CryptoError::datei(&pfade.zertifikat, e))?;
        let private_key_pem = std::fs::read_to_string(&pfade.schluessel)
            .map_err(|e| CryptoError::datei(&pfade.schluessel, e))?;
        Self::aus_pem(&certificate_pem, &private_key_pem)
    }

    /// Gibt den Zertifikat-Fingerprint zurueck
    pub fn fingerprint(&self) -> &str {
        &self.certificate_fingerprint
    }
}

impl std::fmt::Debug for TlsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsServer")
            .field("fingerprint", &self.certificate_fingerprint)
            .finish()
    }
}

fn parse_certificates(pem: &str) -> CryptoResult<Vec<CertificateDer<'static>>> {
    let mut cursor = std::io::Cursor::new(pem.as_bytes());
    let chain = certs(&mut cursor)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CryptoError::Tls(format!("Zertifikat-Parsing fehlgeschlagen: {}", e)))?;
    if chain.is_empty() {
        return Err(CryptoError::Tls("Kein Zertifikat gefunden".to_string()));
    }
    Ok(chain)
}

fn parse_private_key(pem: &str) -> CryptoResult<PrivateKeyDer<'static>> {
    let mut cursor = std::io::Cursor::new(pem.as_bytes());
    private_key(&mut cursor)
        .map_err(|e| CryptoError::Tls(format!("Schluessel-Parsing fehlgeschlagen: {}", e)))?
        .ok_or_else(|| CryptoError::Tls("Kein privater Schluessel gefunden".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
