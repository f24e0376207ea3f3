// ============================================================================
// API Client : Binance
// ============================================================================
// Récupère le prix courant et les chandelles depuis l'API publique Binance
//
// Endpoints utilisés :
// - GET /api/v3/ticker/price?symbol=BTCUSDT
//   -> {"symbol":"BTCUSDT","price":"42000.50000000"}
// - GET /api/v3/klines?symbol=BTCUSDT&interval=3m&limit=288
//   -> [[openTime,"open","high","low","close",...], ...]
//
// CONCEPTS RUST :
// 1. async/await : requêtes non-bloquantes
// 2. Result<T, FetchError> : erreurs typées (statut, transport, parsing)
// 3. Serde : désérialisation JSON
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::MarketApi;
use crate::error::FetchError;
use crate::models::{Candle, RangeKey};

// ============================================================================
// Structures pour parser la réponse JSON de Binance
// ============================================================================

/// Réponse de /api/v3/ticker/price
///
/// Le prix est normalement une chaîne ("42000.5"), on accepte aussi un nombre.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: serde_json::Value,
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP pour l'API Binance
#[derive(Debug, Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceClient {
    /// Crée un client pour l'URL de base donnée
    ///
    /// Sans timeout explicite, reqwest n'en applique aucun.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    /// GET sur une URL, retourne le corps si le statut est 2xx
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        debug!(url = %url, "Sending HTTP request to Binance");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Binance returned error status");
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MarketApi for BinanceClient {
    #[instrument(skip(self))]
    async fn current_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = price_url(&self.base_url, symbol);
        let body = self.fetch_body(&url).await?;
        let price = parse_price_body(&body)?;

        debug!(price, "Fetched current price");
        Ok(price)
    }

    #[instrument(skip(self, range), fields(range = %range))]
    async fn candles(&self, symbol: &str, range: RangeKey) -> Result<Vec<Candle>, FetchError> {
        let url = klines_url(&self.base_url, symbol, range);
        let body = self.fetch_body(&url).await?;
        let candles = parse_candles_body(&body)?;

        info!(candles = candles.len(), "Successfully fetched candles");
        Ok(candles)
    }
}

// ============================================================================
// Construction des URLs
// ============================================================================

/// URL du prix courant
pub fn price_url(base_url: &str, symbol: &str) -> String {
    format!("{}/api/v3/ticker/price?symbol={}", base_url, symbol)
}

/// URL des chandelles pour une plage
pub fn klines_url(base_url: &str, symbol: &str, range: RangeKey) -> String {
    format!(
        "{}/api/v3/klines?symbol={}&interval={}&limit={}",
        base_url,
        symbol,
        range.interval(),
        range.limit()
    )
}

// ============================================================================
// Parsing des réponses
// ============================================================================

/// Extrait le prix d'un corps {"price": "..."}
///
/// Un prix non numérique, non fini ou négatif est une erreur de parsing.
pub fn parse_price_body(body: &str) -> Result<f64, FetchError> {
    let ticker: TickerPrice = serde_json::from_str(body)?;

    let price = match &ticker.price {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| FetchError::Parse(format!("non-numeric price {}", ticker.price)))?;

    if !price.is_finite() || price < 0.0 {
        return Err(FetchError::Parse(format!("invalid price {}", price)));
    }

    Ok(price)
}

/// Parse un tableau de chandelles
pub fn parse_candles_body(body: &str) -> Result<Vec<Candle>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_price_url() {
        let url = price_url("https://api.binance.com", "BTCUSDT");
        assert_eq!(url, "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT");
    }

    #[test]
    fn test_klines_url() {
        let url = klines_url("https://api.binance.com", "BTCUSDT", RangeKey::Today);
        assert_eq!(
            url,
            "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=3m&limit=288"
        );

        let url = klines_url("http://localhost", "ETHUSDT", RangeKey::SixMonths);
        assert!(url.ends_with("symbol=ETHUSDT&interval=1d&limit=186"));
    }

    #[test]
    fn test_parse_price_body() {
        let price = parse_price_body(r#"{"symbol":"BTCUSDT","price":"42000.5"}"#).unwrap();
        assert_eq!(price, 42000.5);

        // Nombre JSON accepté aussi
        let price = parse_price_body(r#"{"price":42000.5}"#).unwrap();
        assert_eq!(price, 42000.5);
    }

    #[test]
    fn test_parse_price_body_invalid() {
        for body in [
            r#"{"price":"abc"}"#,
            r#"{"price":null}"#,
            r#"{"price":"-1"}"#,
            r#"{"symbol":"BTCUSDT"}"#,
            "not json",
        ] {
            let err = parse_price_body(body).unwrap_err();
            assert_eq!(err.kind(), FailureKind::ParseFailure, "body: {}", body);
        }
    }

    #[test]
    fn test_parse_candles_body() {
        let body = r#"[
            [1700000000000,"0","0","0","100","0",0,"0",0,"0","0","0"],
            [1700003600000,"0","0","0","200","0",0,"0",0,"0","0","0"]
        ]"#;
        let candles = parse_candles_body(body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, "200");

        let err = parse_candles_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ParseFailure);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = BinanceClient::new("http://localhost:8080/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
