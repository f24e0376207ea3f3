// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées de la bibliothèque
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - #[error("...")] définit le message affiché
// - Le binaire (main.rs) reste en anyhow, la bibliothèque expose des types précis
// ============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Catégorie d'un échec de récupération
///
/// - FetchFailure : statut HTTP non 2xx ou erreur réseau
/// - ParseFailure : corps de réponse qui ne correspond pas au format attendu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FetchFailure,
    ParseFailure,
}

/// Erreur lors d'un appel à l'API de prix / chandelles
#[derive(Debug, Error)]
pub enum FetchError {
    /// Le serveur a répondu avec un statut non 2xx
    #[error("HTTP {status} returned by {url}")]
    Status { status: StatusCode, url: String },

    /// La requête n'a pas abouti (DNS, connexion, timeout...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Le corps de la réponse est invalide
    #[error("invalid response body: {0}")]
    Parse(String),
}

impl FetchError {
    /// Retourne la catégorie de l'erreur
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status { .. } | FetchError::Transport { .. } => FailureKind::FetchFailure,
            FetchError::Parse(_) => FailureKind::ParseFailure,
        }
    }

    /// Vrai si le serveur a répondu avec un statut d'erreur
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Erreur de configuration (variables d'environnement invalides)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
