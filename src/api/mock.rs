// ============================================================================
// MockApi : implémentation scriptée de MarketApi pour les tests
// ============================================================================
// Chaque appel consomme la prochaine réponse de la file correspondante.
// Une réponse peut être immédiate ou différée : dans ce cas le test la
// débloque via un oneshot, ce qui permet de contrôler l'ordre de résolution.
// ============================================================================

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;

use crate::api::MarketApi;
use crate::error::FetchError;
use crate::models::{Candle, RangeKey};

/// Réponse scriptée
pub enum Reply<T> {
    Ready(Result<T, FetchError>),
    Deferred(oneshot::Receiver<Result<T, FetchError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, FetchError> {
        match self {
            Reply::Ready(result) => result,
            Reply::Deferred(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Parse("reply dropped".to_string()))),
        }
    }
}

#[derive(Default)]
pub struct MockApi {
    prices: Mutex<VecDeque<Reply<f64>>>,
    candles: Mutex<HashMap<RangeKey, VecDeque<Reply<Vec<Candle>>>>>,
    price_calls: Mutex<usize>,
    candle_calls: Mutex<Vec<RangeKey>>,

    /// Délai appliqué à chaque réponse de prix (horloge tokio)
    price_latency: Option<Duration>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// API dont chaque réponse de prix met `latency` à arriver
    pub fn with_price_latency(latency: Duration) -> Self {
        Self {
            price_latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn push_price(&self, result: Result<f64, FetchError>) {
        self.prices.lock().unwrap().push_back(Reply::Ready(result));
    }

    /// Réponse de prix débloquée plus tard par le test
    pub fn defer_price(&self) -> oneshot::Sender<Result<f64, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.prices.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_candles(&self, range: RangeKey, result: Result<Vec<Candle>, FetchError>) {
        self.candles
            .lock()
            .unwrap()
            .entry(range)
            .or_default()
            .push_back(Reply::Ready(result));
    }

    pub fn defer_candles(&self, range: RangeKey) -> oneshot::Sender<Result<Vec<Candle>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.candles
            .lock()
            .unwrap()
            .entry(range)
            .or_default()
            .push_back(Reply::Deferred(rx));
        tx
    }

    pub fn price_calls(&self) -> usize {
        *self.price_calls.lock().unwrap()
    }

    pub fn candle_calls(&self) -> Vec<RangeKey> {
        self.candle_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketApi for MockApi {
    async fn current_price(&self, _symbol: &str) -> Result<f64, FetchError> {
        *self.price_calls.lock().unwrap() += 1;
        let reply = self.prices.lock().unwrap().pop_front();
        if let Some(latency) = self.price_latency {
            tokio::time::sleep(latency).await;
        }
        match reply {
            Some(reply) => reply.resolve().await,
            // File vide : on répète un prix fixe
            None => Ok(1.0),
        }
    }

    async fn candles(&self, _symbol: &str, range: RangeKey) -> Result<Vec<Candle>, FetchError> {
        self.candle_calls.lock().unwrap().push(range);
        let reply = self
            .candles
            .lock()
            .unwrap()
            .get_mut(&range)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(FetchError::Parse(format!("no scripted candles for {}", range))),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Erreur HTTP 500
pub fn server_error() -> FetchError {
    FetchError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url: "http://mock/api/v3/ticker/price".to_string(),
    }
}

/// Chandelles dont les clôtures valent `closes`, espacées d'une heure
pub fn candles_closing_at(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open_time = 1_700_000_000_000 + i as i64 * 3_600_000;
            serde_json::from_value(serde_json::json!([
                open_time,
                "0",
                "0",
                "0",
                close.to_string(),
                "0",
                open_time + 3_599_999,
                "0",
                0,
                "0",
                "0",
                "0"
            ]))
            .expect("valid candle")
        })
        .collect()
}
