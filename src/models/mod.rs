// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod candle; // Chandelles Binance et plages de temps
pub mod chart;  // Série et configuration du graphique
pub mod price;  // État du prix courant

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyprice::models::candle::Candle;
// On peut faire : use lazyprice::models::Candle;
pub use candle::{Candle, RangeKey};
pub use chart::{ChartData, ChartDisplayConfig, ChartSeries};
pub use price::{format_price, PriceState};
