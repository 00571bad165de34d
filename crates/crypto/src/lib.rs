//! # rtcrest-crypto
//!
//! TLS fuer den HTTPS/WSS-Server.
//!
//! Browser erlauben `getUserMedia` nur in sicheren Kontexten; fuer den
//! Zugriff aus dem LAN braucht der Server daher HTTPS. Beim ersten Start
//! wird ein selbstsigniertes Zertifikat erzeugt und als PEM abgelegt.
//!
//! ## Module
//! - `zertifikat` - Erzeugung und Bootstrap (Dateien anlegen oder wiederverwenden)
//! - `tls` - rustls-Acceptor aus den PEM-Dateien
//! - `error` - Fehlertypen

pub mod error;
pub mod tls;
pub mod zertifikat;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use tls::{crypto_provider_installieren, TlsServer};
pub use zertifikat::{
    compute_certificate_fingerprint, generate_self_signed_cert, lokale_ipv4_adressen,
    zertifikat_sicherstellen, SelbstsigniertesZertifikat, TlsPfade, ZertifikatOptionen,
    ZertifikatQuelle,
};
