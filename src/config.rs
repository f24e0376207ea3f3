// ============================================================================
// Module : config
// ============================================================================
// Paramètres de l'application, avec valeurs par défaut et surcharge par
// variables d'environnement (un fichier .env est chargé au démarrage)
//
// | Variable               | Défaut                  |
// |------------------------|-------------------------|
// | LAZYPRICE_API_URL      | https://api.binance.com |
// | LAZYPRICE_SYMBOL       | BTCUSDT                 |
// | LAZYPRICE_NAME         | Bitcoin                 |
// | LAZYPRICE_POLL_SECS    | 3                       |
// | LAZYPRICE_RANGE        | today                   |
// | LAZYPRICE_TIMEOUT_SECS | (aucun)                 |
// | LAZYPRICE_UTC          | false                   |
// ============================================================================

use std::time::Duration;

use chrono::{FixedOffset, Local, Offset, Utc};
use tracing::debug;

use crate::error::ConfigError;
use crate::models::RangeKey;

/// URL par défaut de l'API Binance
pub const DEFAULT_API_URL: &str = "https://api.binance.com";

/// Période par défaut du polling de prix
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration complète
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API (sans slash final)
    pub api_base_url: String,

    /// Symbole Binance (ex: "BTCUSDT")
    pub symbol: String,

    /// Nom affiché (ex: "Bitcoin"), utilisé dans les messages d'erreur
    pub display_name: String,

    /// Période entre deux récupérations du prix
    pub poll_interval: Duration,

    /// Plage affichée au démarrage
    pub initial_range: RangeKey,

    /// Timeout des requêtes HTTP (None : défaut du transport)
    pub request_timeout: Option<Duration>,

    /// Labels du graphique en UTC plutôt qu'en heure locale
    pub utc_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            symbol: "BTCUSDT".to_string(),
            display_name: "Bitcoin".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            initial_range: RangeKey::default(),
            request_timeout: None,
            utc_labels: false,
        }
    }
}

impl Config {
    /// Charge la configuration depuis l'environnement (après lecture du .env)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Absence de .env : pas une erreur
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    ///
    /// CONCEPT RUST : Closures génériques
    /// - F: Fn(&str) -> Option<String> accepte std::env::var ou une HashMap en test
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("LAZYPRICE_API_URL") {
            config.api_base_url = parse_url(&url)?;
        }

        if let Some(symbol) = lookup("LAZYPRICE_SYMBOL") {
            config.symbol = parse_symbol(&symbol)?;
        }

        if let Some(name) = lookup("LAZYPRICE_NAME") {
            let name = name.trim();
            if !name.is_empty() {
                config.display_name = name.to_string();
            }
        }

        if let Some(secs) = lookup("LAZYPRICE_POLL_SECS") {
            let secs = parse_secs("LAZYPRICE_POLL_SECS", &secs)?;
            if secs == 0 {
                return Err(invalid("LAZYPRICE_POLL_SECS", "0", "must be greater than zero"));
            }
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(range) = lookup("LAZYPRICE_RANGE") {
            config.initial_range = range.parse()?;
        }

        if let Some(secs) = lookup("LAZYPRICE_TIMEOUT_SECS") {
            let secs = parse_secs("LAZYPRICE_TIMEOUT_SECS", &secs)?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(flag) = lookup("LAZYPRICE_UTC") {
            config.utc_labels = parse_bool("LAZYPRICE_UTC", &flag)?;
        }

        Ok(config)
    }

    /// Fuseau horaire des labels du graphique
    pub fn label_offset(&self) -> FixedOffset {
        if self.utc_labels {
            Utc.fix()
        } else {
            Local::now().offset().fix()
        }
    }

    /// Label du dataset ("Bitcoin Price (USD)")
    pub fn dataset_label(&self) -> String {
        format!("{} Price (USD)", self.display_name)
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_url(value: &str) -> Result<String, ConfigError> {
    let url = value.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(invalid("LAZYPRICE_API_URL", value, "must start with http:// or https://"));
    }
    Ok(url.to_string())
}

fn parse_symbol(value: &str) -> Result<String, ConfigError> {
    let symbol = value.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("LAZYPRICE_SYMBOL", value, "must be a non-empty alphanumeric symbol"));
    }
    Ok(symbol)
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "expected a whole number of seconds"))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
