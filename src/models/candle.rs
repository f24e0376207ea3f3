// ============================================================================
// Structure : Candle (kline Binance)
// ============================================================================
// Représente une chandelle telle que renvoyée par /api/v3/klines
//
// Binance renvoie chaque chandelle sous forme de tableau positionnel à 12 champs :
// [openTime, "open", "high", "low", "close", "volume", closeTime,
//  "quoteVolume", trades, "takerBase", "takerQuote", "ignore"]
//
// CONCEPT RUST : Serde et tableaux positionnels
// - Un struct à champs nommés dérivant Deserialize accepte aussi une séquence
// - Les éléments sont affectés aux champs dans l'ordre de déclaration
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FetchError};

/// Plage de temps sélectionnable pour le graphique
///
/// Chaque plage correspond à un couple (intervalle, nombre de chandelles)
/// envoyé à l'API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeKey {
    /// 288 chandelles de 3 minutes (~1 jour)
    Today,
    /// 168 chandelles de 1 heure (7 jours)
    Week,
    /// 31 chandelles journalières
    Month,
    /// 186 chandelles journalières
    SixMonths,
    /// 365 chandelles journalières
    Year,
}

impl RangeKey {
    /// Intervalle des chandelles au format Binance
    pub fn interval(&self) -> &'static str {
        match self {
            RangeKey::Today => "3m",
            RangeKey::Week => "1h",
            RangeKey::Month | RangeKey::SixMonths | RangeKey::Year => "1d",
        }
    }

    /// Nombre de chandelles demandées
    pub fn limit(&self) -> u32 {
        match self {
            RangeKey::Today => 288,
            RangeKey::Week => 168,
            RangeKey::Month => 31,
            RangeKey::SixMonths => 186,
            RangeKey::Year => 365,
        }
    }

    /// Label court pour les onglets
    pub fn label(&self) -> &'static str {
        match self {
            RangeKey::Today => "1D",
            RangeKey::Week => "1W",
            RangeKey::Month => "1M",
            RangeKey::SixMonths => "6M",
            RangeKey::Year => "1Y",
        }
    }

    /// Nom utilisé dans la configuration et les logs
    pub fn name(&self) -> &'static str {
        match self {
            RangeKey::Today => "today",
            RangeKey::Week => "week",
            RangeKey::Month => "month",
            RangeKey::SixMonths => "sixMonths",
            RangeKey::Year => "year",
        }
    }

    /// Toutes les plages, dans l'ordre d'affichage
    pub fn all() -> [RangeKey; 5] {
        [
            RangeKey::Today,
            RangeKey::Week,
            RangeKey::Month,
            RangeKey::SixMonths,
            RangeKey::Year,
        ]
    }

    /// Position dans `all()`
    pub fn index(&self) -> usize {
        match self {
            RangeKey::Today => 0,
            RangeKey::Week => 1,
            RangeKey::Month => 2,
            RangeKey::SixMonths => 3,
            RangeKey::Year => 4,
        }
    }

    /// Plage suivante (cycle)
    pub fn next(&self) -> RangeKey {
        match self {
            RangeKey::Today => RangeKey::Week,
            RangeKey::Week => RangeKey::Month,
            RangeKey::Month => RangeKey::SixMonths,
            RangeKey::SixMonths => RangeKey::Year,
            RangeKey::Year => RangeKey::Today, // Boucle
        }
    }

    /// Plage précédente (cycle)
    pub fn previous(&self) -> RangeKey {
        match self {
            RangeKey::Today => RangeKey::Year, // Boucle
            RangeKey::Week => RangeKey::Today,
            RangeKey::Month => RangeKey::Week,
            RangeKey::SixMonths => RangeKey::Month,
            RangeKey::Year => RangeKey::SixMonths,
        }
    }
}

impl Default for RangeKey {
    /// Plage affichée à l'activation : la journée en cours
    fn default() -> Self {
        RangeKey::Today
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RangeKey {
    type Err = ConfigError;

    /// Accepte le nom ("sixMonths", "six_months") ou le label ("6M")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        match normalized.as_str() {
            "today" | "day" | "1d" => Ok(RangeKey::Today),
            "week" | "1w" => Ok(RangeKey::Week),
            "month" | "1m" => Ok(RangeKey::Month),
            "sixmonths" | "6m" => Ok(RangeKey::SixMonths),
            "year" | "1y" => Ok(RangeKey::Year),
            _ => Err(ConfigError::InvalidValue {
                key: "range",
                value: s.to_string(),
                reason: "expected one of today, week, month, sixMonths, year".to_string(),
            }),
        }
    }
}

/// Une chandelle Binance (12 champs positionnels)
///
/// Les prix et volumes sont des chaînes décimales, comme dans la réponse brute.
/// Seuls `open_time` et `close` sont utilisés pour le graphique.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candle {
    /// Heure d'ouverture (epoch en millisecondes)
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    /// Prix de clôture
    pub close: String,
    pub volume: String,
    /// Heure de fermeture (epoch en millisecondes)
    pub close_time: i64,
    pub quote_volume: String,
    pub trades: u64,
    pub taker_buy_base_volume: String,
    pub taker_buy_quote_volume: String,
    /// Champ réservé par Binance, jamais lu
    pub ignore: serde_json::Value,
}

impl Candle {
    /// Parse le prix de clôture
    pub fn close_price(&self) -> Result<f64, FetchError> {
        let value: f64 = self
            .close
            .trim()
            .parse()
            .map_err(|_| FetchError::Parse(format!("non-numeric close price {:?}", self.close)))?;

        if !value.is_finite() {
            return Err(FetchError::Parse(format!("non-finite close price {:?}", self.close)));
        }
        Ok(value)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = r#"[1700000000000,"0","0","0","100","0",0,"0",0,"0","0","0"]"#;

    #[test]
    fn test_candle_from_positional_array() {
        let candle: Candle = serde_json::from_str(ROW).unwrap();
        assert_eq!(candle.open_time, 1_700_000_000_000);
        assert_eq!(candle.close, "100");
        assert_eq!(candle.close_price().unwrap(), 100.0);
    }

    #[test]
    fn test_candle_wrong_arity() {
        let short = r#"[1700000000000,"0","0","0","100"]"#;
        assert!(serde_json::from_str::<Candle>(short).is_err());
    }

    #[test]
    fn test_close_price_invalid() {
        let mut candle: Candle = serde_json::from_str(ROW).unwrap();
        candle.close = "abc".to_string();
        assert!(candle.close_price().is_err());
    }

    #[test]
    fn test_range_query_pairs() {
        assert_eq!((RangeKey::Today.interval(), RangeKey::Today.limit()), ("3m", 288));
        assert_eq!((RangeKey::Week.interval(), RangeKey::Week.limit()), ("1h", 168));
        assert_eq!((RangeKey::Month.interval(), RangeKey::Month.limit()), ("1d", 31));
        assert_eq!((RangeKey::SixMonths.interval(), RangeKey::SixMonths.limit()), ("1d", 186));
        assert_eq!((RangeKey::Year.interval(), RangeKey::Year.limit()), ("1d", 365));
    }

    #[test]
    fn test_range_cycle() {
        assert_eq!(RangeKey::Today.next(), RangeKey::Week);
        assert_eq!(RangeKey::Year.next(), RangeKey::Today); // Boucle
        assert_eq!(RangeKey::Today.previous(), RangeKey::Year);
        for range in RangeKey::all() {
            assert_eq!(range.next().previous(), range);
            assert_eq!(RangeKey::all()[range.index()], range);
        }
    }

    #[test]
    fn test_range_from_str() {
        assert_eq!("sixMonths".parse::<RangeKey>().unwrap(), RangeKey::SixMonths);
        assert_eq!("six_months".parse::<RangeKey>().unwrap(), RangeKey::SixMonths);
        assert_eq!("1Y".parse::<RangeKey>().unwrap(), RangeKey::Year);
        assert!("decade".parse::<RangeKey>().is_err());
    }

    #[test]
    fn test_range_serde_name() {
        let json = serde_json::to_string(&RangeKey::SixMonths).unwrap();
        assert_eq!(json, "\"sixMonths\"");
    }
}
