// ============================================================================
// Module : state
// ============================================================================
// Les deux unités de récupération de données, indépendantes l'une de l'autre :
// - PricePoller : prix courant, récupéré périodiquement
// - ChartLoader : chandelles de la plage sélectionnée, à la demande
//
// Chacune publie son état dans un tokio::sync::watch, lu par l'UI.
// ============================================================================

pub mod chart; // Chargement du graphique
pub mod gate;  // Jetons de génération des requêtes
pub mod price; // Polling du prix

pub use chart::{ChartLoader, ChartView, LoadedChart};
pub use gate::{RequestGate, Ticket};
pub use price::PricePoller;
