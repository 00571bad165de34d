//! Fest eingebautes Benutzerverzeichnis
//!
//! Die API ist eine Attrappe: die Liste wird nie veraendert, `POST`
//! meldet nur die ID, die ein neuer Eintrag bekommen wuerde.

use serde::{Deserialize, Serialize};

/// Ein Benutzer-Datensatz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benutzer {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl Benutzer {
    fn neu(id: u64, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

/// Unveraenderliche Benutzerliste
#[derive(Debug, Clone)]
pub struct BenutzerVerzeichnis {
    benutzer: Vec<Benutzer>,
}

impl BenutzerVerzeichnis {
    /// Verzeichnis mit eigenen Eintraegen
    pub fn mit_benutzern(benutzer: Vec<Benutzer>) -> Self {
        Self { benutzer }
    }

    /// Alle Eintraege in Einfuegereihenfolge
    pub fn alle(&self) -> &[Benutzer] {
        &self.benutzer
    }

    /// ID die ein neu angelegter Benutzer bekaeme
    pub fn naechste_id(&self) -> u64 {
        self.benutzer.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }
}

impl Default for BenutzerVerzeichnis {
    fn default() -> Self {
        Self::mit_benutzern(vec![
            Benutzer::neu(1, "John Doe", "john@example.com"),
            Benutzer::neu(2, "Jane Smith", "jane@example.com"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_hat_zwei_eintraege() {
        let v = BenutzerVerzeichnis::default();
        assert_eq!(v.alle().len(), 2);
        assert_eq!(v.alle()[0].name, "John Doe");
        assert_eq!(v.alle()[1].email, "jane@example.com");
        assert_eq!(v.naechste_id(), 3);
    }

    #[test]
    fn leeres_verzeichnis_beginnt_bei_eins() {
        let v = BenutzerVerzeichnis::mit_benutzern(vec![]);
        assert_eq!(v.naechste_id(), 1);
    }

    #[test]
    fn naechste_id_folgt_dem_maximum() {
        let v = BenutzerVerzeichnis::mit_benutzern(vec![
            Benutzer::neu(10, "a", "a@x"),
            Benutzer::neu(4, "b", "b@x"),
        ]);
        assert_eq!(v.naechste_id(), 11);
    }
}
