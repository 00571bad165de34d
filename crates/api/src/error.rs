//! Fehlertypen fuer die emulierte REST-API

use thiserror::Error;

/// Fehler beim Uebersetzen eines DataChannel-Umschlags in eine HTTP-Anfrage
/// oder einer HTTP-Antwort zurueck in einen Umschlag
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Ungueltige Methode: {0}")]
    UngueltigeMethode(String),

    #[error("Ungueltiger Header '{name}': {grund}")]
    UngueltigerHeader { name: String, grund: String },

    #[error("Ungueltiger JSON-Body: {0}")]
    UngueltigerBody(String),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP-Statuscode fuer die Fehlerantwort
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UngueltigeMethode(_)
            | Self::UngueltigerHeader { .. }
            | Self::UngueltigerBody(_) => 400,
            Self::Intern(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuscodes() {
        assert_eq!(ApiError::UngueltigeMethode("G T".into()).http_status(), 400);
        assert_eq!(
            ApiError::UngueltigerHeader {
                name: "x".into(),
                grund: "y".into()
            }
            .http_status(),
            400
        );
        assert_eq!(ApiError::Intern("boom".into()).http_status(), 500);
    }

    #[test]
    fn fehlertext_nennt_header() {
        let e = ApiError::UngueltigerHeader {
            name: "X-Test".into(),
            grund: "Steuerzeichen".into(),
        };
        assert!(e.to_string().contains("X-Test"));
    }
}
