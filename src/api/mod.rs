// ============================================================================
// Module : api
// ============================================================================
// Clients pour récupérer le prix courant et les chandelles
//
// CONCEPT RUST : Traits comme point d'extension
// - MarketApi décrit ce dont les unités de données ont besoin
// - BinanceClient l'implémente avec de vraies requêtes HTTP
// - Les tests fournissent leur propre implémentation (mock)
// ============================================================================

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Candle, RangeKey};

pub mod binance; // Client API Binance

#[cfg(test)]
pub mod mock; // Implémentation scriptée pour les tests

// Re-export des éléments principaux
pub use binance::BinanceClient;

/// Source de prix et de chandelles
///
/// CONCEPT RUST : #[async_trait]
/// - Les méthodes async de trait retournent des futures "boxées"
/// - Send + Sync : l'implémentation peut être partagée entre tâches tokio
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Prix courant du symbole
    async fn current_price(&self, symbol: &str) -> Result<f64, FetchError>;

    /// Chandelles du symbole pour une plage de temps
    async fn candles(&self, symbol: &str, range: RangeKey) -> Result<Vec<Candle>, FetchError>;
}
