//! Fehlertypen fuer das Kryptografie-Subsystem

use std::path::PathBuf;

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Zertifikat-Generierung fehlgeschlagen: {0}")]
    ZertifikatGenerierung(String),

    #[error("TLS-Fehler: {0}")]
    Tls(String),

    #[error("Datei '{pfad}' nicht verwendbar: {quelle}")]
    Datei {
        pfad: PathBuf,
        #[source]
        quelle: std::io::Error,
    },
}

impl CryptoError {
    pub(crate) fn datei(pfad: impl Into<PathBuf>, quelle: std::io::Error) -> Self {
        Self::Datei {
            pfad: pfad.into(),
            quelle,
        }
    }
}

impl From<rcgen::Error> for CryptoError {
    fn from(e: rcgen::Error) -> Self {
        Self::ZertifikatGenerierung(e.to_string())
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
